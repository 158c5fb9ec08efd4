//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, LinkError, OtpError, PasswordError, PasswordRule, TokenError};

use thiserror::Error;

/// Core domain errors
///
/// Anticipated failures are bridged from the per-concern enums;
/// `Internal` carries any unforeseen collaborator failure to the
/// orchestrator boundary where it surfaces as a generic server error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// HTTP status class for this error
    ///
    /// Client-recoverable validation failures map to 400, token failures
    /// to 401, account-state rejections to 403, throttling to 429, and
    /// everything unexpected (including failed dispatches) to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::Validation { .. } => 400,
            DomainError::Internal { .. } => 500,
            DomainError::Auth(error) => match error {
                AuthError::InvalidCredentials | AuthError::WrongProvider { .. } => 400,
                AuthError::AlreadyVerified => 400,
                AuthError::AccountInactive | AuthError::EmailUnverified => 403,
                AuthError::Throttled { .. } => 429,
            },
            DomainError::Otp(error) => match error {
                OtpError::SessionExpired | OtpError::InvalidOtp => 400,
                OtpError::DispatchFailed => 500,
            },
            DomainError::Link(error) => match error {
                LinkError::MissingLink | LinkError::LinkExpired | LinkError::InvalidLink => 400,
                LinkError::DispatchFailed => 500,
            },
            DomainError::Token(error) => match error {
                TokenError::MissingToken
                | TokenError::TokenInvalid
                | TokenError::TokenExpired
                | TokenError::TokenBlacklisted => 401,
                TokenError::TokenGenerationFailed | TokenError::KeyLoadError { .. } => 500,
            },
            DomainError::Password(_) => 400,
        }
    }

    /// Error code for programmatic client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Auth(error) => match error {
                AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
                AuthError::AccountInactive => "ACCOUNT_INACTIVE",
                AuthError::EmailUnverified => "EMAIL_UNVERIFIED",
                AuthError::AlreadyVerified => "ALREADY_VERIFIED",
                AuthError::WrongProvider { .. } => "WRONG_PROVIDER",
                AuthError::Throttled { .. } => "THROTTLED",
            },
            DomainError::Otp(error) => match error {
                OtpError::SessionExpired => "SESSION_EXPIRED",
                OtpError::InvalidOtp => "INVALID_OTP",
                OtpError::DispatchFailed => "OTP_DISPATCH_FAILED",
            },
            DomainError::Link(error) => match error {
                LinkError::MissingLink => "MISSING_LINK",
                LinkError::LinkExpired => "LINK_EXPIRED",
                LinkError::InvalidLink => "INVALID_LINK",
                LinkError::DispatchFailed => "LINK_DISPATCH_FAILED",
            },
            DomainError::Token(error) => match error {
                TokenError::MissingToken => "MISSING_TOKEN",
                TokenError::TokenInvalid => "TOKEN_INVALID",
                TokenError::TokenExpired => "TOKEN_EXPIRED",
                TokenError::TokenBlacklisted => "TOKEN_BLACKLISTED",
                TokenError::TokenGenerationFailed => "TOKEN_GENERATION_FAILED",
                TokenError::KeyLoadError { .. } => "KEY_LOAD_ERROR",
            },
            DomainError::Password(error) => match error {
                PasswordError::PasswordMismatch => "PASSWORD_MISMATCH",
                PasswordError::SamePassword => "SAME_PASSWORD",
                PasswordError::PasswordTooWeak { .. } => "PASSWORD_TOO_WEAK",
            },
        }
    }

    /// Retry hint in seconds, present only for throttled requests
    pub fn retry_after(&self) -> Option<i64> {
        match self {
            DomainError::Auth(AuthError::Throttled { retry_after }) => Some(*retry_after),
            _ => None,
        }
    }

    /// Message safe to surface to a client
    ///
    /// Internal errors keep their originating message outside production
    /// for diagnostics and are scrubbed when `expose_internal` is false.
    pub fn client_message(&self, expose_internal: bool) -> String {
        match self {
            DomainError::Internal { .. } if !expose_internal => {
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_classes() {
        assert_eq!(DomainError::from(AuthError::InvalidCredentials).status_code(), 400);
        assert_eq!(DomainError::from(AuthError::AccountInactive).status_code(), 403);
        assert_eq!(DomainError::from(TokenError::TokenBlacklisted).status_code(), 401);
        assert_eq!(
            DomainError::from(AuthError::Throttled { retry_after: 10 }).status_code(),
            429
        );
        assert_eq!(
            DomainError::Internal {
                message: "boom".to_string()
            }
            .status_code(),
            500
        );
    }

    #[test]
    fn test_retry_after_only_for_throttled() {
        let throttled = DomainError::from(AuthError::Throttled { retry_after: 30 });
        assert_eq!(throttled.retry_after(), Some(30));
        assert_eq!(
            DomainError::from(OtpError::InvalidOtp).retry_after(),
            None
        );
    }

    #[test]
    fn test_internal_message_scrubbed_in_production() {
        let error = DomainError::Internal {
            message: "connection refused at 10.0.0.3".to_string(),
        };
        assert!(error.client_message(true).contains("10.0.0.3"));
        assert!(!error.client_message(false).contains("10.0.0.3"));
    }
}
