//! PostgreSQL credential store implementation

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use crate::domain::user::{CredentialStore, UserId, UserIdentity};
use crate::domain::DomainError;

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        username      TEXT NOT NULL,
        email         TEXT NOT NULL,
        phone         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_username_key UNIQUE (username),
        CONSTRAINT users_phone_key UNIQUE (phone)
    )
"#;

const CREATE_EMAIL_INDEX: &str = r#"
    CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_key ON users (lower(email))
"#;

/// PostgreSQL implementation of CredentialStore
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `url`
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Create the users table and its case-insensitive email index
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create users table: {}", e)))?;

        sqlx::query(CREATE_EMAIL_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create email index: {}", e)))?;

        info!("Users table is up to date");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create(&self, identity: UserIdentity) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(identity.id().as_uuid())
        .bind(identity.username())
        .bind(identity.email())
        .bind(identity.phone())
        .bind(identity.password_hash())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);

            if unique_violation {
                DomainError::conflict(format!(
                    "User '{}' collides with an existing username, email or phone",
                    identity.username()
                ))
            } else {
                DomainError::storage(format!("Failed to create user: {}", e))
            }
        })?;

        Ok(())
    }

    async fn find_by_email_or_username(
        &self,
        key: &str,
    ) -> Result<Option<UserIdentity>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, phone, password_hash
            FROM users
            WHERE lower(email) = lower($1) OR username = $1
            ORDER BY (lower(email) = lower($1)) DESC
            LIMIT 1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email or username: {}", e)))?;

        row.as_ref().map(row_to_identity).transpose()
    }

    async fn find_by_email_and_phone(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<UserIdentity>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, phone, password_hash
            FROM users
            WHERE lower(email) = lower($1) OR phone = $2
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email or phone: {}", e)))?;

        row.as_ref().map(row_to_identity).transpose()
    }
}

fn row_to_identity(row: &PgRow) -> Result<UserIdentity, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Failed to read user row: {}", e));

    let id: Uuid = row.try_get("id").map_err(read)?;
    let username: String = row.try_get("username").map_err(read)?;
    let email: String = row.try_get("email").map_err(read)?;
    let phone: String = row.try_get("phone").map_err(read)?;
    let password_hash: String = row.try_get("password_hash").map_err(read)?;

    Ok(UserIdentity::new(
        UserId::from_uuid(id),
        username,
        email,
        phone,
        password_hash,
    ))
}
