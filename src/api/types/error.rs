//! API error envelope and the mapping from service outcomes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, Field, FieldError, RegistrationError};

/// Message returned for every failed login, whatever the cause
pub const INVALID_CREDENTIALS_MESSAGE: &str = "usuario / contraseña incorrectos";

const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Error categories exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    AuthenticationError,
    ConflictError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::AuthenticationError => write!(f, "authentication_error"),
            Self::ConflictError => write!(f, "conflict_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

/// One rejected field in an error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorDetail {
    pub field: Field,
    pub message: String,
}

impl From<&FieldError> for FieldErrorDetail {
    fn from(err: &FieldError) -> Self {
        Self {
            field: err.field(),
            message: err.to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorDetail>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: None,
                    errors: Vec::new(),
                },
            },
        }
    }

    /// Add error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    /// Attach the per-field problems
    pub fn with_field_errors(mut self, errors: &[FieldError]) -> Self {
        self.response.error.errors = errors.iter().map(FieldErrorDetail::from).collect();
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ApiErrorType::AuthenticationError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorType::ConflictError, message)
    }

    /// Internal failure; the message never carries internal detail
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorType::ServerError,
            INTERNAL_ERROR_MESSAGE,
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match &err {
            RegistrationError::FieldMissing(errors) => {
                Self::bad_request("Faltan campos obligatorios")
                    .with_code("missing_fields")
                    .with_field_errors(errors)
            }
            RegistrationError::ValidationFailed(errors) => {
                Self::bad_request("La solicitud de registro no es válida")
                    .with_code("validation_failed")
                    .with_field_errors(errors)
            }
            RegistrationError::AlreadyRegistered => {
                Self::conflict(err.to_string()).with_code("already_registered")
            }
            RegistrationError::Cancelled => {
                Self::unavailable("La operación no se completó a tiempo").with_code("cancelled")
            }
            RegistrationError::StoreUnavailable | RegistrationError::HashingError => {
                Self::internal()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::FieldMissing(errors) => Self::bad_request("Faltan campos obligatorios")
                .with_code("missing_fields")
                .with_field_errors(errors),
            AuthError::InvalidCredentials => {
                Self::unauthorized(INVALID_CREDENTIALS_MESSAGE).with_code("invalid_credentials")
            }
            AuthError::Cancelled => {
                Self::unavailable("La operación no se completó a tiempo").with_code("cancelled")
            }
            AuthError::StoreUnavailable | AuthError::TokenSigning => Self::internal(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}
