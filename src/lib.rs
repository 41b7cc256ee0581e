//! Credential Issuer
//!
//! Registers user identities behind validated, hashed credentials and
//! exchanges valid credentials for short-lived signed tokens.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use tracing::{info, warn};

use api::state::{AppState, AuthServiceTrait};
use infrastructure::auth::{SigningSecret, TokenIssuer};
use infrastructure::user::{
    Argon2Hasher, AuthService, InMemoryCredentialStore, PostgresCredentialStore,
};

const GENERATED_SECRET_LENGTH: usize = 64;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let issuer = Arc::new(TokenIssuer::new(&load_signing_secret(config)?));
    let hasher = Arc::new(Argon2Hasher::with_config(config.hashing)?);
    let store_timeout = config.auth.store_timeout();

    let auth_service: Arc<dyn AuthServiceTrait> = match config.database_url() {
        Some(url) => {
            info!("Using PostgreSQL credential store");
            let store = PostgresCredentialStore::connect(
                &url,
                config.database.max_connections,
                config.database.connect_timeout(),
            )
            .await?;
            store.migrate().await?;

            Arc::new(
                AuthService::new(Arc::new(store), hasher, issuer)
                    .with_store_timeout(store_timeout),
            )
        }
        None => {
            warn!("No database configured, identities are kept in memory only");
            Arc::new(
                AuthService::new(Arc::new(InMemoryCredentialStore::new()), hasher, issuer)
                    .with_store_timeout(store_timeout),
            )
        }
    };

    Ok(AppState::new(auth_service))
}

/// Load the signing secret, generating a throwaway one when none is set
fn load_signing_secret(config: &AppConfig) -> anyhow::Result<SigningSecret> {
    let secret = match config.jwt_secret() {
        Some(secret) => secret,
        None => {
            warn!("JWT_SECRET_KEY not set, using a random secret; tokens will not survive restarts");
            rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(GENERATED_SECRET_LENGTH)
                .map(char::from)
                .collect()
        }
    };

    Ok(SigningSecret::new(secret)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoginCredentials, RegistrationRequest};

    #[tokio::test]
    async fn test_default_state_registers_and_logs_in() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("state-test-secret".to_string());
        config.database.url = None;

        // DATABASE_URL in the environment would switch to PostgreSQL
        if config.database_url().is_some() {
            return;
        }

        let state = create_app_state_with_config(&config).await.unwrap();

        state
            .auth_service
            .register(RegistrationRequest::new(
                "ana",
                "ana@example.com",
                "5512345678",
                "Password@23",
            ))
            .await
            .unwrap();

        let token = state
            .auth_service
            .login(LoginCredentials::new("ana", "Password@23"))
            .await
            .unwrap();
        assert_eq!(token.subject(), "ana");
    }

    #[test]
    fn test_configured_secret_is_used() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("configured".to_string());

        let secret = load_signing_secret(&config).unwrap();
        let issuer = TokenIssuer::new(&secret);
        let token = issuer.issue("ana").unwrap();

        let expected = TokenIssuer::new(&SigningSecret::new("configured").unwrap());
        assert!(expected.verify(token.as_str()).is_ok());
    }
}
