//! Authentication infrastructure module
//!
//! This module provides JWT access token issuance for logged-in users.

mod jwt;

pub use jwt::{token_lifetime, AuthToken, SigningSecret, TokenClaims, TokenIssuer, TOKEN_ISSUER};
