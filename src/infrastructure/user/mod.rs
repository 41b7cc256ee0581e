//! User infrastructure module
//!
//! This module provides implementations for registration and login,
//! including password hashing with Argon2, in-memory and PostgreSQL
//! credential stores, and the auth service.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, HashingConfig, PasswordHasher};
pub use postgres_repository::PostgresCredentialStore;
pub use repository::InMemoryCredentialStore;
pub use service::{AuthService, DEFAULT_STORE_TIMEOUT};
