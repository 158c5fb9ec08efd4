//! Throttling configuration module

use serde::{Deserialize, Serialize};

/// Per-scope throttle windows
///
/// Each window is the minimum interval in seconds between two attempts
/// of the same action by the same identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThrottleConfig {
    /// Enable throttling
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Window for login/resend OTP dispatches, per user
    pub otp_window_seconds: u64,

    /// Window for email-verification link dispatches, per email
    pub email_verify_window_seconds: u64,

    /// Window for phone OTP dispatches, per phone number
    pub phone_otp_window_seconds: u64,

    /// Window for password-reset link dispatches, per email
    pub password_reset_window_seconds: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            otp_window_seconds: 60,
            email_verify_window_seconds: 60,
            phone_otp_window_seconds: 60,
            password_reset_window_seconds: 60,
        }
    }
}

impl ThrottleConfig {
    /// Create a development configuration (more lenient windows)
    pub fn development() -> Self {
        Self {
            otp_window_seconds: 10,
            email_verify_window_seconds: 10,
            phone_otp_window_seconds: 10,
            password_reset_window_seconds: 10,
            ..Default::default()
        }
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self::default()
    }
}

fn default_enabled() -> bool {
    true
}
