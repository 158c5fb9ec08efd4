//! Token service configuration

use vg_shared::config::JwtConfig;

use crate::domain::entities::token::{
    ACCESS_TOKEN_LIFETIME_MINUTES, JWT_AUDIENCE, JWT_ISSUER, REFRESH_TOKEN_LIFETIME_DAYS,
};

/// Configuration for JWT issuance and verification
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Access token lifetime in minutes
    pub access_token_lifetime_minutes: i64,

    /// Refresh token lifetime in days
    pub refresh_token_lifetime_days: i64,

    /// Issuer claim stamped into and required of every token
    pub issuer: String,

    /// Audience claim stamped into and required of every token
    pub audience: String,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime_minutes: ACCESS_TOKEN_LIFETIME_MINUTES,
            refresh_token_lifetime_days: REFRESH_TOKEN_LIFETIME_DAYS,
            issuer: JWT_ISSUER.to_string(),
            audience: JWT_AUDIENCE.to_string(),
        }
    }
}

impl TokenServiceConfig {
    /// Derive from the application JWT configuration
    pub fn from_jwt_config(config: &JwtConfig) -> Self {
        Self {
            access_token_lifetime_minutes: config.access_token_lifetime_minutes,
            refresh_token_lifetime_days: config.refresh_token_lifetime_days,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }
}
