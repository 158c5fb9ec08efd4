//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - JWT and signed-link configuration
//! - `cache` - Redis cache configuration
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `otp` - OTP generation and login-session configuration
//! - `throttle` - Per-scope throttle windows

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod otp;
pub mod throttle;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{JwtConfig, SignedLinkConfig};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LoggingConfig};
pub use otp::OtpConfig;
pub use throttle::ThrottleConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Signed-link configuration
    pub link: SignedLinkConfig,

    /// OTP configuration
    pub otp: OtpConfig,

    /// Throttling configuration
    pub throttle: ThrottleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            jwt: JwtConfig::default(),
            link: SignedLinkConfig::default(),
            otp: OtpConfig::default(),
            throttle: ThrottleConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        Self {
            environment: env,
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            jwt: JwtConfig::from_env(),
            link: SignedLinkConfig::from_env(),
            otp: OtpConfig::from_env(),
            throttle: match env {
                Environment::Production => ThrottleConfig::production(),
                _ => ThrottleConfig::development(),
            },
            logging: LoggingConfig::for_environment(env),
        }
    }
}
