//! Auth service: registration and login orchestration

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::task;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::domain::user::{
    check_login_fields, check_required_fields, validate_registration, AuthError,
    CredentialStore, LoginCredentials, RegistrationError, RegistrationRequest, UserId,
    UserIdentity,
};
use crate::domain::DomainError;
use crate::infrastructure::auth::{AuthToken, TokenIssuer};

use super::password::PasswordHasher;

/// Bound applied to store calls when the caller does not pass one
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Hashed once per service; logins for unknown accounts verify against it
const DECOY_PASSWORD: &str = "decoy-credential";

/// A store call that ran past its deadline
struct DeadlineElapsed;

/// Run a store call, giving up once `deadline` passes
async fn bounded<T>(
    deadline: Instant,
    call: impl Future<Output = Result<T, DomainError>>,
) -> Result<Result<T, DomainError>, DeadlineElapsed> {
    timeout_at(deadline, call).await.map_err(|_| DeadlineElapsed)
}

/// Registers identities and authenticates them into signed tokens
///
/// Holds no per-request state; every call is independent.
pub struct AuthService<S: CredentialStore, H: PasswordHasher> {
    store: Arc<S>,
    hasher: Arc<H>,
    issuer: Arc<TokenIssuer>,
    store_timeout: Duration,
    decoy_hash: OnceCell<String>,
}

impl<S: CredentialStore, H: PasswordHasher + 'static> AuthService<S, H> {
    /// Create a new auth service
    pub fn new(store: Arc<S>, hasher: Arc<H>, issuer: Arc<TokenIssuer>) -> Self {
        Self {
            store,
            hasher,
            issuer,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Override the default bound on store calls
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }

    /// Register a new identity using the default store timeout
    pub async fn register(&self, request: RegistrationRequest) -> Result<(), RegistrationError> {
        self.register_within(request, self.store_timeout).await
    }

    /// Register a new identity, bounding all store I/O by `timeout`
    pub async fn register_within(
        &self,
        request: RegistrationRequest,
        timeout: Duration,
    ) -> Result<(), RegistrationError> {
        let deadline = Instant::now() + timeout;

        let missing = check_required_fields(&request);
        if !missing.is_empty() {
            debug!(count = missing.len(), "Registration rejected: missing fields");
            return Err(RegistrationError::FieldMissing(missing));
        }

        let invalid = validate_registration(&request);
        if !invalid.is_empty() {
            debug!(count = invalid.len(), "Registration rejected: invalid fields");
            return Err(RegistrationError::ValidationFailed(invalid));
        }

        let existing = bounded(
            deadline,
            self.store
                .find_by_email_and_phone(&request.email, &request.phone),
        )
        .await
        .map_err(|_| {
            warn!("Registration cancelled: uniqueness lookup timed out");
            RegistrationError::Cancelled
        })?
        .map_err(|e| {
            error!(error = %e, "Registration failed: uniqueness lookup error");
            RegistrationError::StoreUnavailable
        })?;

        if existing.is_some() {
            debug!("Registration rejected: email or phone already registered");
            return Err(RegistrationError::AlreadyRegistered);
        }

        let password_hash = self
            .hash_password(request.password.clone())
            .await
            .map_err(|e| {
                error!(error = %e, "Registration failed: password hashing error");
                RegistrationError::HashingError
            })?;

        let RegistrationRequest {
            username,
            email,
            phone,
            ..
        } = request;
        let identity = UserIdentity::new(UserId::generate(), username, email, phone, password_hash);
        let user_id = *identity.id();
        let username = identity.username().to_string();

        match bounded(deadline, self.store.create(identity)).await {
            Err(DeadlineElapsed) => {
                warn!(username = %username, "Registration cancelled: store write timed out");
                Err(RegistrationError::Cancelled)
            }
            Ok(Err(e)) if e.is_conflict() => {
                debug!(error = %e, "Registration rejected: unique key taken at write");
                Err(RegistrationError::AlreadyRegistered)
            }
            Ok(Err(e)) => {
                error!(error = %e, "Registration failed: store write error");
                Err(RegistrationError::StoreUnavailable)
            }
            Ok(Ok(())) => {
                info!(user_id = %user_id, username = %username, "User registered");
                Ok(())
            }
        }
    }

    /// Authenticate and issue a token using the default store timeout
    pub async fn login(&self, credentials: LoginCredentials) -> Result<AuthToken, AuthError> {
        self.login_within(credentials, self.store_timeout).await
    }

    /// Authenticate and issue a token, bounding the store lookup by `timeout`
    ///
    /// An unknown account and a wrong password produce the same error.
    pub async fn login_within(
        &self,
        credentials: LoginCredentials,
        timeout: Duration,
    ) -> Result<AuthToken, AuthError> {
        let deadline = Instant::now() + timeout;

        let missing = check_login_fields(&credentials);
        if !missing.is_empty() {
            debug!(count = missing.len(), "Login rejected: missing fields");
            return Err(AuthError::FieldMissing(missing));
        }

        let identity = bounded(
            deadline,
            self.store
                .find_by_email_or_username(&credentials.email_or_username),
        )
        .await
        .map_err(|_| {
            warn!("Login cancelled: identity lookup timed out");
            AuthError::Cancelled
        })?
        .map_err(|e| {
            error!(error = %e, "Login failed: identity lookup error");
            AuthError::StoreUnavailable
        })?;

        let Some(identity) = identity else {
            // Same verify cost as a wrong password
            if let Some(decoy) = self.decoy_hash().await {
                self.verify_password(decoy, credentials.password).await;
            }
            debug!("Login rejected: no matching account");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_password(identity.password_hash().to_string(), credentials.password)
            .await
        {
            debug!(user_id = %identity.id(), "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issuer.issue(identity.username()).map_err(|e| {
            error!(error = %e, "Login failed: token signing error");
            AuthError::TokenSigning
        })?;

        info!(user_id = %identity.id(), "User logged in");
        Ok(token)
    }

    /// Hash on the blocking thread pool
    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Hashing task failed: {}", e)))?
    }

    /// Verify on the blocking pool; a failed task counts as a mismatch
    async fn verify_password(&self, hash: String, password: String) -> bool {
        let hasher = Arc::clone(&self.hasher);

        match task::spawn_blocking(move || hasher.verify(&hash, &password)).await {
            Ok(matches) => matches,
            Err(e) => {
                error!(error = %e, "Password verification task failed");
                false
            }
        }
    }

    async fn decoy_hash(&self) -> Option<String> {
        self.decoy_hash
            .get_or_try_init(|| self.hash_password(DECOY_PASSWORD.to_string()))
            .await
            .map_err(|e| warn!(error = %e, "Could not build decoy hash"))
            .ok()
            .cloned()
    }
}
