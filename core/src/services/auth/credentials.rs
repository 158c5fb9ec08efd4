//! Credential validation against the user store

use std::sync::Arc;

use vg_shared::utils::mask_email;

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::UserRepository;

/// Validator for email/password credentials and account state
pub struct CredentialValidator<U: UserRepository> {
    users: Arc<U>,
}

impl<U: UserRepository> CredentialValidator<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    /// Check an email/password pair and the account's state
    ///
    /// Fails with `InvalidCredentials` when the email is unknown or the
    /// password does not match; account-state failures are reported
    /// afterwards so an attacker cannot probe account existence without
    /// valid credentials. No side effects.
    pub async fn validate(&self, email: &str, password: &str) -> DomainResult<User> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        let matches =
            bcrypt::verify(password, &user.password_hash).map_err(|e| DomainError::Internal {
                message: format!("Password verification failed: {}", e),
            })?;
        if !matches {
            tracing::warn!(
                email = %mask_email(email),
                event = "credential_check_failed",
                "Password mismatch"
            );
            return Err(DomainError::Auth(AuthError::InvalidCredentials));
        }

        Self::check_account_state(&user)?;
        Ok(user)
    }

    /// Account-state checks shared with the resend path, which never
    /// sees the password again
    pub fn check_account_state(user: &User) -> DomainResult<()> {
        if !user.is_active {
            return Err(DomainError::Auth(AuthError::AccountInactive));
        }
        if user.is_email_provider() {
            if !user.is_email_verified {
                return Err(DomainError::Auth(AuthError::EmailUnverified));
            }
        } else {
            return Err(DomainError::Auth(AuthError::WrongProvider {
                provider: user.auth_provider.to_string(),
            }));
        }
        Ok(())
    }
}
