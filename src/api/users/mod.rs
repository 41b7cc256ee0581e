//! User registration and login endpoints

use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{LoginCredentials, RegistrationRequest};

pub const REGISTERED_MESSAGE: &str = "Usuario registrado exitosamente";

/// Create the users router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Registration request
///
/// Absent fields decode as empty so they surface as missing-field errors
/// rather than body decoding errors.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl From<RegisterUserRequest> for RegistrationRequest {
    fn from(request: RegisterUserRequest) -> Self {
        RegistrationRequest::new(
            request.username,
            request.email,
            request.phone,
            request.password,
        )
    }
}

/// Login request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginUserRequest {
    #[serde(rename = "emailOrUsername")]
    pub email_or_username: String,
    pub password: String,
}

impl From<LoginUserRequest> for LoginCredentials {
    fn from(request: LoginUserRequest) -> Self {
        LoginCredentials::new(request.email_or_username, request.password)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterUserResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUserResponse {
    pub token: String,
    pub expires_at: String,
}

/// POST /api/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Json<RegisterUserResponse>, ApiError> {
    state.auth_service.register(request.into()).await?;

    Ok(Json(RegisterUserResponse {
        message: REGISTERED_MESSAGE.to_string(),
    }))
}

/// POST /api/users/login
///
/// Every credential failure answers with the same 401 body.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginUserRequest>,
) -> Result<Json<LoginUserResponse>, ApiError> {
    let token = state.auth_service.login(request.into()).await?;
    let expires_at = token.expires_at().to_rfc3339();

    Ok(Json(LoginUserResponse {
        token: token.into_string(),
        expires_at,
    }))
}
