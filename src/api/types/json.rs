//! JSON extractor whose rejections use the API error envelope

use axum::{
    extract::{rejection::JsonRejection as AxumJsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::{ApiError, ApiErrorType};

/// Wrapper around `axum::Json` that reports undecodable bodies as `ApiError`
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Json(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
                Err(rejection_to_error(&rejection))
            }
        }
    }
}

/// Undecodable bodies are 400; a missing content type keeps axum's 415
fn rejection_to_error(rejection: &AxumJsonRejection) -> ApiError {
    use AxumJsonRejection::*;

    let (status, message) = match rejection {
        MissingJsonContentType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Se esperaba el encabezado Content-Type 'application/json'".to_string(),
        ),
        JsonDataError(err) => (
            StatusCode::BAD_REQUEST,
            format!("Error al decodificar la solicitud: {}", err.body_text()),
        ),
        JsonSyntaxError(err) => (
            StatusCode::BAD_REQUEST,
            format!("Error al decodificar la solicitud: {}", err.body_text()),
        ),
        BytesRejection(_) => (
            StatusCode::BAD_REQUEST,
            "No se pudo leer el cuerpo de la solicitud".to_string(),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            "Error al decodificar la solicitud".to_string(),
        ),
    };

    ApiError::new(status, ApiErrorType::InvalidRequestError, message).with_code("json_parse_error")
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
