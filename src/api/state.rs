//! Application state for shared services

use std::sync::Arc;

use crate::domain::{AuthError, CredentialStore, LoginCredentials, RegistrationError, RegistrationRequest};
use crate::infrastructure::auth::AuthToken;
use crate::infrastructure::user::{AuthService, PasswordHasher};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServiceTrait>,
}

impl AppState {
    pub fn new(auth_service: Arc<dyn AuthServiceTrait>) -> Self {
        Self { auth_service }
    }
}

/// Trait for registration and login
#[async_trait::async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn register(&self, request: RegistrationRequest) -> Result<(), RegistrationError>;
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthToken, AuthError>;
}

#[async_trait::async_trait]
impl<S, H> AuthServiceTrait for AuthService<S, H>
where
    S: CredentialStore + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, request: RegistrationRequest) -> Result<(), RegistrationError> {
        AuthService::register(self, request).await
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthToken, AuthError> {
        AuthService::login(self, credentials).await
    }
}
