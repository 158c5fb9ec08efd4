//! Operation request payloads
//!
//! One struct per externally visible operation, independent of wire
//! format. Field-level validation covers presence and shape; the
//! services enforce everything stateful.

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::errors::DomainError;

/// Login with email and password
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Re-dispatch the login OTP for a pending login
#[derive(Debug, Clone, Deserialize)]
pub struct ResendOtpRequest {
    pub user_id: Uuid,
}

/// Exchange a pending login's OTP for a token pair
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TokenExchangeRequest {
    pub user_id: Uuid,

    #[validate(length(min = 1, message = "OTP is required"))]
    pub otp: String,
}

/// Rotate a refresh token
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Revoke a refresh token on logout
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    pub refresh: String,
}

/// Request a verification or password-reset link by email
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
}

/// Signed-link check, token and expiry as received from the client
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LinkVerifyRequest {
    pub token: Option<String>,
    pub expiry: Option<String>,
}

/// Finish a password reset through a signed link
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetFinishRequest {
    pub token: Option<String>,
    pub expiry: Option<String>,
    pub password: String,
    pub c_password: String,
}

/// Verify the phone OTP of an authenticated user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PhoneOtpRequest {
    #[validate(length(min = 1, message = "OTP is required"))]
    pub otp: String,
}

/// Federated login with a provider-issued token
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SocialLoginRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 1, message = "Provider is required"))]
    pub provider: String,
}

/// Flatten field validation errors into a single domain error
pub fn validation_error(errors: ValidationErrors) -> DomainError {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    parts.sort();
    DomainError::Validation {
        message: parts.join("; "),
    }
}
