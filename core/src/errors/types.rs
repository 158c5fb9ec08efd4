//! Domain-specific error types for authentication and related operations
//!
//! Each enum covers one concern of the verification pipeline; all of
//! them are anticipated, client-facing failures. Unexpected collaborator
//! failures are carried by `DomainError::Internal` instead.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// Authentication and account-state errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Email address is not verified")]
    EmailUnverified,

    #[error("Email address is already verified")]
    AlreadyVerified,

    #[error("Account was created via {provider}. Please continue with {provider}")]
    WrongProvider { provider: String },

    #[error("Request was throttled. Expected available in {retry_after} seconds.")]
    Throttled { retry_after: i64 },
}

/// One-time-passcode errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Login session expired. Please login again")]
    SessionExpired,

    #[error("Invalid one-time passcode")]
    InvalidOtp,

    #[error("Failed to dispatch one-time passcode")]
    DispatchFailed,
}

/// Signed-link errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("Verification link is missing required parameters")]
    MissingLink,

    #[error("Verification link has expired")]
    LinkExpired,

    #[error("Verification link is invalid")]
    InvalidLink,

    #[error("Failed to dispatch verification link")]
    DispatchFailed,
}

/// Token issuance and rotation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Refresh token is required")]
    MissingToken,

    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been blacklisted")]
    TokenBlacklisted,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Failed to load signing keys: {message}")]
    KeyLoadError { message: String },
}

/// A single password-strength rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordRule {
    Short,
    Lower,
    Upper,
    Number,
    Special,
}

impl PasswordRule {
    /// Short code used in error payloads
    pub fn code(&self) -> &'static str {
        match self {
            PasswordRule::Short => "short",
            PasswordRule::Lower => "lower",
            PasswordRule::Upper => "upper",
            PasswordRule::Number => "number",
            PasswordRule::Special => "special",
        }
    }

    /// Human-readable rule description
    pub fn message(&self) -> &'static str {
        match self {
            PasswordRule::Short => "Password must be at least 8 characters long.",
            PasswordRule::Lower => "Password must contain at least one lowercase letter.",
            PasswordRule::Upper => "Password must contain at least one uppercase letter.",
            PasswordRule::Number => "Password must contain at least one number.",
            PasswordRule::Special => "Password must contain at least one special character.",
        }
    }
}

impl fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn format_rules(rules: &BTreeSet<PasswordRule>) -> String {
    rules
        .iter()
        .map(|r| r.code())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Password submission errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("New password cannot be the same as the old password.")]
    SamePassword,

    #[error("Password is too weak: {}", format_rules(.rules))]
    PasswordTooWeak { rules: BTreeSet<PasswordRule> },
}
