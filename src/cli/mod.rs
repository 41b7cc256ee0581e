//! Command line entry points
//!
//! - `serve`: run the HTTP API
//! - `migrate`: create the PostgreSQL schema

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// Credential Issuer - user registration and token issuance
#[derive(Parser)]
#[command(name = "credential-issuer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,

    /// Apply the PostgreSQL schema and exit
    Migrate,
}

/// Load `.env` and configuration, then install logging
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();
    settle_config(AppConfig::load())
}

/// Fall back to defaults on a load failure, reporting it once logging is up
fn settle_config(loaded: Result<AppConfig, config::ConfigError>) -> AppConfig {
    match loaded {
        Ok(config) => {
            init_logging(&config.logging);
            config
        }
        Err(e) => {
            let config = AppConfig::default();
            init_logging(&config.logging);
            warn!(error = %e, "Failed to load configuration, continuing with defaults");
            config
        }
    }
}
