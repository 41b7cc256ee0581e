//! Registration and login input validation
//!
//! Presence checks run first and short-circuit. Shape and strength rules are
//! then evaluated independently so every problem is reported in one pass.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entity::{LoginCredentials, RegistrationRequest};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 12;

/// Characters that satisfy the special-character rule
pub const PASSWORD_SPECIAL_CHARACTERS: [char; 3] = ['@', '$', '&'];

/// local@domain.tld with a single `@` and no whitespace
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").unwrap());

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

/// Input field an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Username,
    Email,
    Phone,
    Password,
    EmailOrUsername,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Username => "nombre de usuario",
            Self::Email => "correo electrónico",
            Self::Phone => "teléfono",
            Self::Password => "contraseña",
            Self::EmailOrUsername => "email o nombre de usuario",
        };
        write!(f, "{}", label)
    }
}

/// A single rejected input rule
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Falta el campo {0}")]
    Missing(Field),

    #[error("el formato del correo electrónico no es válido")]
    InvalidEmail,

    #[error("el teléfono debe tener 10 dígitos")]
    InvalidPhone,

    #[error("la contraseña debe tener al menos {0} caracteres")]
    PasswordTooShort(usize),

    #[error("la contraseña debe tener máximo {0} caracteres")]
    PasswordTooLong(usize),

    #[error("la contraseña debe incluir al menos una letra mayúscula")]
    PasswordMissingUppercase,

    #[error("la contraseña debe incluir al menos una letra minúscula")]
    PasswordMissingLowercase,

    #[error("la contraseña debe incluir al menos un número")]
    PasswordMissingDigit,

    #[error("la contraseña debe incluir al menos un carácter especial (@, $, &)")]
    PasswordMissingSpecial,
}

impl FieldError {
    /// The input field this error is about
    pub fn field(&self) -> Field {
        match self {
            Self::Missing(field) => *field,
            Self::InvalidEmail => Field::Email,
            Self::InvalidPhone => Field::Phone,
            Self::PasswordTooShort(_)
            | Self::PasswordTooLong(_)
            | Self::PasswordMissingUppercase
            | Self::PasswordMissingLowercase
            | Self::PasswordMissingDigit
            | Self::PasswordMissingSpecial => Field::Password,
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Report every registration field that is empty or whitespace only
pub fn check_required_fields(request: &RegistrationRequest) -> Vec<FieldError> {
    [
        (Field::Username, &request.username),
        (Field::Email, &request.email),
        (Field::Phone, &request.phone),
        (Field::Password, &request.password),
    ]
    .into_iter()
    .filter(|(_, value)| is_blank(value))
    .map(|(field, _)| FieldError::Missing(field))
    .collect()
}

/// Report every login field that is empty or whitespace only
pub fn check_login_fields(credentials: &LoginCredentials) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if is_blank(&credentials.email_or_username) {
        errors.push(FieldError::Missing(Field::EmailOrUsername));
    }

    if is_blank(&credentials.password) {
        errors.push(FieldError::Missing(Field::Password));
    }

    errors
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(FieldError::InvalidEmail)
    }
}

pub fn validate_phone(phone: &str) -> Result<(), FieldError> {
    if PHONE_PATTERN.is_match(phone) {
        Ok(())
    } else {
        Err(FieldError::InvalidPhone)
    }
}

/// Check password strength, returning one error per unmet rule
///
/// Rules:
/// - Between 6 and 12 characters
/// - At least one ASCII uppercase letter, ASCII lowercase letter and digit
/// - At least one of `@`, `$`, `&`
pub fn validate_password(password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if length > MAX_PASSWORD_LENGTH {
        errors.push(FieldError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::PasswordMissingUppercase);
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(FieldError::PasswordMissingLowercase);
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::PasswordMissingDigit);
    }

    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(&c)) {
        errors.push(FieldError::PasswordMissingSpecial);
    }

    errors
}

/// Run the shape and strength rules over a registration request
///
/// Assumes `check_required_fields` already passed. Returns an empty list when
/// the request is well formed; uniqueness is checked separately against the
/// credential store.
pub fn validate_registration(request: &RegistrationRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if let Err(e) = validate_email(&request.email) {
        errors.push(e);
    }

    if let Err(e) = validate_phone(&request.phone) {
        errors.push(e);
    }

    errors.extend(validate_password(&request.password));

    errors
}
