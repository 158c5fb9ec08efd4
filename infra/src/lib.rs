//! # Verigate Infrastructure
//!
//! Concrete implementations of the core's external collaborator
//! interfaces: the Redis cache store, the MySQL user store and refresh
//! token ledger, message dispatchers, and the Google OAuth adapter.

pub mod cache;
pub mod database;
pub mod dispatch;
pub mod oauth;

use vg_shared::config::AppConfig;

/// Load the application configuration from the environment
///
/// Reads `.env` if present, then builds the configuration from
/// environment variables with development defaults.
pub fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();
    AppConfig::from_env()
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Message dispatch error
    #[error("Dispatch error: {0}")]
    Dispatch(String),
}
