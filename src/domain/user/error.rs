//! Outcomes of the register and login operations

use thiserror::Error;

use super::validation::FieldError;

/// Why a registration was refused
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("missing required fields")]
    FieldMissing(Vec<FieldError>),

    #[error("registration request is invalid")]
    ValidationFailed(Vec<FieldError>),

    #[error("el correo/telefono ya se encuentra registrado")]
    AlreadyRegistered,

    #[error("credential store unavailable")]
    StoreUnavailable,

    #[error("password hashing failed")]
    HashingError,

    #[error("operation cancelled before completion")]
    Cancelled,
}

impl RegistrationError {
    /// Field-level problems, empty for non-validation outcomes
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::FieldMissing(errors) | Self::ValidationFailed(errors) => errors,
            _ => &[],
        }
    }
}

/// Why a login was refused
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing required fields")]
    FieldMissing(Vec<FieldError>),

    /// Unknown account and wrong password both land here
    #[error("usuario / contraseña incorrectos")]
    InvalidCredentials,

    #[error("credential store unavailable")]
    StoreUnavailable,

    #[error("token signing failed")]
    TokenSigning,

    #[error("operation cancelled before completion")]
    Cancelled,
}

impl AuthError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::FieldMissing(errors) => errors,
            _ => &[],
        }
    }
}
