//! Infrastructure layer - Hashing, token signing, persistence and logging

pub mod auth;
pub mod logging;
pub mod user;
