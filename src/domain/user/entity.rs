//! User identity and the transient request types that produce or use it

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Opaque user identifier, assigned once at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted user record
///
/// Immutable once created. The password hash is skipped on serialization and
/// hidden from `Debug` output.
#[derive(Clone, Serialize)]
pub struct UserIdentity {
    id: UserId,
    username: String,
    email: String,
    phone: String,
    #[serde(skip_serializing)]
    password_hash: String,
}

impl UserIdentity {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            phone: phone.into(),
            password_hash: password_hash.into(),
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserIdentity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password_hash", &"[hidden]")
            .finish()
    }
}

/// Plaintext registration input, alive for one `register` call
#[derive(Clone, Default)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl RegistrationRequest {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            phone: phone.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[hidden]")
            .finish()
    }
}

/// Plaintext login input; the key matches either an email or a username
#[derive(Clone, Default)]
pub struct LoginCredentials {
    pub email_or_username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email_or_username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email_or_username: email_or_username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email_or_username", &self.email_or_username)
            .field("password", &"[hidden]")
            .finish()
    }
}
