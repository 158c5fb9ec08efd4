//! One-time-passcode configuration

use serde::{Deserialize, Serialize};

/// Configuration for OTP generation and the cache-backed login session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of digits in a generated code
    pub code_length: usize,

    /// Lifetime of a cached code in seconds
    pub otp_ttl_seconds: u64,

    /// Lifetime of the cached login credentials in seconds
    ///
    /// Must outlive the OTP so the exchange step can re-validate the
    /// original credentials after the code is entered.
    pub session_ttl_seconds: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            otp_ttl_seconds: 300,     // 5 minutes
            session_ttl_seconds: 600, // 10 minutes
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            code_length: defaults.code_length,
            otp_ttl_seconds: std::env::var("OTP_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.otp_ttl_seconds),
            session_ttl_seconds: std::env::var("OTP_SESSION_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_ttl_seconds),
        }
    }
}
