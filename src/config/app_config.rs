use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::user::{HashingConfig, DEFAULT_STORE_TIMEOUT};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub hashing: HashingConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret; falls back to `JWT_SECRET_KEY`
    pub jwt_secret: Option<String>,
    /// Upper bound on credential store calls per request
    pub store_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; falls back to `DATABASE_URL`, in-memory store when unset
    pub url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[hidden]"))
            .field("store_timeout_ms", &self.store_timeout_ms)
            .finish()
    }
}

impl AuthConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connect_timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Signing secret from configuration, else from `JWT_SECRET_KEY`
    pub fn jwt_secret(&self) -> Option<String> {
        self.auth
            .jwt_secret
            .clone()
            .or_else(|| std::env::var("JWT_SECRET_KEY").ok())
            .filter(|secret| !secret.is_empty())
    }

    /// Database URL from configuration, else from `DATABASE_URL`
    pub fn database_url(&self) -> Option<String> {
        self.database
            .url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.auth.store_timeout(), Duration::from_secs(5));
        assert_eq!(config.hashing, HashingConfig::default());
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("auth.store_timeout_ms", 250)
            .unwrap()
            .set_override("logging.format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.auth.store_timeout(), Duration::from_millis(250));
        assert!(config.auth.jwt_secret.is_none());
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_configured_secret_wins() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("from-config".to_string());

        assert_eq!(config.jwt_secret().as_deref(), Some("from-config"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("from-config".to_string());

        assert!(!format!("{:?}", config).contains("from-config"));
    }
}
