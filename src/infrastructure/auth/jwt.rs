//! JWT access token issuance and verification

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Issuer label stamped into every token
pub const TOKEN_ISSUER: &str = "credential-issuer";

/// Lifetime of an issued token
pub fn token_lifetime() -> Duration {
    Duration::hours(1)
}

/// Symmetric signing secret, loaded once at startup
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wrap raw secret bytes; an empty secret is a configuration error
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, DomainError> {
        let bytes = bytes.into();

        if bytes.is_empty() {
            return Err(DomainError::configuration("JWT signing secret cannot be empty"));
        }

        Ok(Self(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret([hidden])")
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
    /// Issuer label
    pub iss: String,
}

impl TokenClaims {
    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// A freshly signed access token and the claims it carries
#[derive(Clone)]
pub struct AuthToken {
    token: String,
    subject: String,
    issuer: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Compact JWS serialization, signature included
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn into_string(self) -> String {
        self.token
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"[hidden]")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// HS256 token issuer bound to one signing secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &Algorithm::HS256)
            .field("issuer", &TOKEN_ISSUER)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenIssuer {
    /// Create an issuer signing with `secret`
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for `subject`, valid for one hour from now
    pub fn issue(&self, subject: &str) -> Result<AuthToken, DomainError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + token_lifetime();

        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: TOKEN_ISSUER.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign JWT: {}", e)))?;

        Ok(AuthToken {
            token,
            subject: claims.sub,
            issuer: claims.iss,
            issued_at,
            expires_at,
        })
    }

    /// Check signature, issuer and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<TokenClaims, DomainError> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| DomainError::internal(format!("Invalid JWT: {}", e)))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&SigningSecret::new(secret).unwrap())
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = create_issuer("test-secret-key-12345");

        let token = issuer.issue("testuser").unwrap();
        assert!(!token.as_str().is_empty());
        assert_eq!(token.subject(), "testuser");
        assert_eq!(token.issuer(), TOKEN_ISSUER);

        let claims = issuer.verify(token.as_str()).unwrap();
        assert_eq!(claims.sub, "testuser");
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_lifetime_is_one_hour() {
        let issuer = create_issuer("test-secret");

        let token = issuer.issue("testuser").unwrap();
        assert_eq!(token.expires_at() - token.issued_at(), Duration::hours(1));

        let claims = issuer.verify(token.as_str()).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.iat, token.issued_at().timestamp());
    }

    #[test]
    fn test_invalid_token() {
        let issuer = create_issuer("test-secret");
        assert!(issuer.verify("invalid-token").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let issuer1 = create_issuer("secret-1");
        let issuer2 = create_issuer("secret-2");

        let token = issuer1.issue("testuser").unwrap();
        assert!(issuer2.verify(token.as_str()).is_err());
    }

    #[test]
    fn test_expired_token() {
        let issuer = create_issuer("test-secret");

        let past_time = Utc::now() - Duration::hours(2);
        let claims = TokenClaims {
            sub: "testuser".to_string(),
            iat: (past_time - Duration::hours(1)).timestamp(),
            exp: past_time.timestamp(),
            iss: TOKEN_ISSUER.to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(claims.is_expired());
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let issuer = create_issuer("test-secret");
        let now = Utc::now();
        let claims = TokenClaims {
            sub: "testuser".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            iss: "someone-else".to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            SigningSecret::new(Vec::new()),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_debug_hides_secret_material() {
        let secret = SigningSecret::new("super-secret-value").unwrap();
        assert!(!format!("{:?}", secret).contains("super-secret-value"));

        let token = TokenIssuer::new(&secret).issue("testuser").unwrap();
        assert!(!format!("{:?}", token).contains(token.as_str()));
    }
}
