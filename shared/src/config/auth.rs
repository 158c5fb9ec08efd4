//! Authentication and signed-link configuration

use serde::{Deserialize, Serialize};

/// JWT authentication configuration
///
/// Tokens are signed with an RS256 keypair: the private key signs, the
/// public key verifies.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Path to the PEM-encoded private key used for signing
    pub private_key_path: String,

    /// Path to the PEM-encoded public key used for verification
    pub public_key_path: String,

    /// Access token lifetime in minutes
    pub access_token_lifetime_minutes: i64,

    /// Refresh token lifetime in days
    pub refresh_token_lifetime_days: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            private_key_path: String::from("keys/jwt_private_key.pem"),
            public_key_path: String::from("keys/jwt_public_key.pem"),
            access_token_lifetime_minutes: 30,
            refresh_token_lifetime_days: 1,
            issuer: String::from("verigate"),
            audience: String::from("verigate-api"),
        }
    }
}

impl JwtConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH")
                .unwrap_or(defaults.private_key_path),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH")
                .unwrap_or(defaults.public_key_path),
            access_token_lifetime_minutes: std::env::var("JWT_ACCESS_TOKEN_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.access_token_lifetime_minutes),
            refresh_token_lifetime_days: std::env::var("JWT_REFRESH_TOKEN_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_token_lifetime_days),
            issuer: defaults.issuer,
            audience: defaults.audience,
        }
    }

    /// Set access token lifetime in minutes
    pub fn with_access_lifetime_minutes(mut self, minutes: i64) -> Self {
        self.access_token_lifetime_minutes = minutes;
        self
    }

    /// Set refresh token lifetime in days
    pub fn with_refresh_lifetime_days(mut self, days: i64) -> Self {
        self.refresh_token_lifetime_days = days;
        self
    }
}

/// Signed-link configuration for email verification and password reset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignedLinkConfig {
    /// Secret key for the link MAC
    pub secret: String,

    /// Link lifetime in minutes
    pub lifetime_minutes: i64,

    /// Frontend base URL embedded in dispatched links
    pub frontend_url: String,
}

impl Default for SignedLinkConfig {
    fn default() -> Self {
        Self {
            secret: String::from("link-signing-secret-change-in-production"),
            lifetime_minutes: 15,
            frontend_url: String::from("http://localhost:3000"),
        }
    }
}

impl SignedLinkConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("LINK_SIGNING_SECRET").unwrap_or(defaults.secret),
            lifetime_minutes: std::env::var("LINK_LIFETIME_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.lifetime_minutes),
            frontend_url: std::env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
        }
    }

    /// Check if the default secret is still in use (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == "link-signing-secret-change-in-production"
    }
}
