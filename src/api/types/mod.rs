//! Request/response plumbing shared by the HTTP handlers

pub mod error;
pub mod json;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType, FieldErrorDetail};
pub use json::Json;
