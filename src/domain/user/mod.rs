//! User domain
//!
//! Identity types, the credential store contract, registration validation
//! rules and the error outcomes of registration and login.

mod entity;
mod error;
mod repository;
mod validation;

pub use entity::{LoginCredentials, RegistrationRequest, UserId, UserIdentity};
pub use error::{AuthError, RegistrationError};
pub use repository::CredentialStore;
pub use validation::{
    check_login_fields, check_required_fields, validate_email, validate_password,
    validate_phone, validate_registration, Field, FieldError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH, PASSWORD_SPECIAL_CHARACTERS,
};

#[cfg(test)]
pub use repository::MockCredentialStore;
