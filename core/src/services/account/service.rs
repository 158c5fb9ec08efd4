//! Account verification sub-flows
//!
//! Email verification, password reset, and phone verification are
//! single-purpose flows parallel to the login state machine, composed
//! from the signed-link issuer, the OTP manager, and the throttle
//! guard.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use vg_shared::utils::{is_valid_phone_number, mask_email};

use crate::domain::entities::user::User;
use crate::domain::value_objects::requests::{
    validation_error, EmailRequest, LinkVerifyRequest, PasswordResetFinishRequest,
    PhoneOtpRequest,
};
use crate::domain::value_objects::responses::{LinkDispatchAck, OtpDispatchAck, ResetLinkCheck};
use crate::errors::{
    AuthError, DomainError, DomainResult, LinkError, PasswordError,
};
use crate::repositories::{FlagUpdate, UserRepository};
use crate::services::auth::validate_password;
use crate::services::cache::CacheStore;
use crate::services::dispatch::{Channel, MessageDispatcher};
use crate::services::link::{LinkPurpose, SignedLinkService};
use crate::services::otp::OtpManager;
use crate::services::throttle::{ThrottleGuard, ThrottleScope};

/// Orchestrator of the email, password-reset, and phone sub-flows
pub struct AccountFlowService<U, C, D>
where
    U: UserRepository,
    C: CacheStore,
    D: MessageDispatcher,
{
    users: Arc<U>,
    throttle: ThrottleGuard<C>,
    otp_manager: OtpManager<C, D>,
    links: SignedLinkService,
    dispatcher: Arc<D>,
    frontend_url: String,
}

impl<U, C, D> AccountFlowService<U, C, D>
where
    U: UserRepository,
    C: CacheStore,
    D: MessageDispatcher,
{
    pub fn new(
        users: Arc<U>,
        throttle: ThrottleGuard<C>,
        otp_manager: OtpManager<C, D>,
        links: SignedLinkService,
        dispatcher: Arc<D>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            throttle,
            otp_manager,
            links,
            dispatcher,
            frontend_url: frontend_url.into(),
        }
    }

    /// Request an email-verification link
    pub async fn start_email_verification(
        &self,
        request: EmailRequest,
    ) -> DomainResult<LinkDispatchAck> {
        request.validate().map_err(validation_error)?;

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;
        if !user.is_email_provider() {
            return Err(DomainError::Auth(AuthError::WrongProvider {
                provider: user.auth_provider.to_string(),
            }));
        }
        if user.is_email_verified {
            return Err(DomainError::Auth(AuthError::AlreadyVerified));
        }

        self.throttle
            .acquire(ThrottleScope::EmailVerify, &user.email)
            .await?;

        self.dispatch_link(&user, LinkPurpose::EmailVerify, "verify-email")
            .await
    }

    /// Consume an email-verification link
    ///
    /// Activates the account and marks the email verified.
    pub async fn finish_email_verification(&self, request: LinkVerifyRequest) -> DomainResult<()> {
        let email = self.links.verify(
            request.token.as_deref(),
            request.expiry.as_deref(),
            LinkPurpose::EmailVerify,
        )?;

        let user = self.resolve_link_user(&email).await?;
        self.users
            .update_flags(
                user.id,
                FlagUpdate::default()
                    .with_active(true)
                    .with_email_verified(true),
            )
            .await?;

        tracing::info!(
            user_id = %user.id,
            email = %mask_email(&email),
            event = "email_verified",
            "Email verification completed"
        );
        Ok(())
    }

    /// Request a password-reset link
    ///
    /// Same account-state checks as email verification plus the
    /// active-account check.
    pub async fn start_password_reset(
        &self,
        request: EmailRequest,
    ) -> DomainResult<LinkDispatchAck> {
        request.validate().map_err(validation_error)?;

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;
        if !user.is_email_provider() {
            return Err(DomainError::Auth(AuthError::WrongProvider {
                provider: user.auth_provider.to_string(),
            }));
        }
        if !user.is_active {
            return Err(DomainError::Auth(AuthError::AccountInactive));
        }
        if !user.is_email_verified {
            return Err(DomainError::Auth(AuthError::EmailUnverified));
        }

        self.throttle
            .acquire(ThrottleScope::PasswordReset, &user.email)
            .await?;

        self.dispatch_link(&user, LinkPurpose::PasswordReset, "reset-password")
            .await
    }

    /// Validate a password-reset link without consuming it
    pub async fn check_password_reset_link(
        &self,
        request: LinkVerifyRequest,
    ) -> DomainResult<ResetLinkCheck> {
        let email = self.links.verify(
            request.token.as_deref(),
            request.expiry.as_deref(),
            LinkPurpose::PasswordReset,
        )?;
        Ok(ResetLinkCheck { email })
    }

    /// Set a new password through a password-reset link
    ///
    /// The two submitted passwords must match, the new password must
    /// differ from the current one, and the strength policy reports all
    /// failing rules at once.
    pub async fn finish_password_reset(
        &self,
        request: PasswordResetFinishRequest,
    ) -> DomainResult<()> {
        let email = self.links.verify(
            request.token.as_deref(),
            request.expiry.as_deref(),
            LinkPurpose::PasswordReset,
        )?;
        let user = self.resolve_link_user(&email).await?;

        if request.password != request.c_password {
            return Err(DomainError::Password(PasswordError::PasswordMismatch));
        }

        let unchanged = bcrypt::verify(&request.password, &user.password_hash).map_err(|e| {
            DomainError::Internal {
                message: format!("Password verification failed: {}", e),
            }
        })?;
        if unchanged {
            return Err(DomainError::Password(PasswordError::SamePassword));
        }

        validate_password(&request.password)
            .map_err(|rules| DomainError::Password(PasswordError::PasswordTooWeak { rules }))?;

        let hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST).map_err(|e| {
            DomainError::Internal {
                message: format!("Password hashing failed: {}", e),
            }
        })?;
        self.users.set_password_hash(user.id, &hash).await?;

        tracing::info!(
            user_id = %user.id,
            email = %mask_email(&email),
            event = "password_reset",
            "Password reset completed"
        );
        Ok(())
    }

    /// Dispatch a phone verification code to the authenticated user
    pub async fn start_phone_verification(&self, user_id: Uuid) -> DomainResult<OtpDispatchAck> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;
        let phone = self.verified_phone(&user)?;

        self.throttle
            .acquire(ThrottleScope::PhoneOtp, &phone)
            .await?;

        self.otp_manager.start_phone_verification(&phone).await?;

        Ok(OtpDispatchAck {
            user_id: user.id,
            otp_dispatched: true,
        })
    }

    /// Verify the phone code of the authenticated user
    pub async fn finish_phone_verification(
        &self,
        user_id: Uuid,
        request: PhoneOtpRequest,
    ) -> DomainResult<()> {
        request.validate().map_err(validation_error)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;
        let phone = self.verified_phone(&user)?;

        self.otp_manager.verify_phone_otp(&phone, &request.otp).await?;

        self.users
            .update_flags(user.id, FlagUpdate::default().with_phone_verified(true))
            .await?;

        tracing::info!(
            user_id = %user.id,
            event = "phone_verified",
            "Phone verification completed"
        );
        Ok(())
    }

    /// A signed link is only valid when its email still resolves to a
    /// local-provider account
    async fn resolve_link_user(&self, email: &str) -> DomainResult<User> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Link(LinkError::InvalidLink))?;
        if !user.is_email_provider() {
            return Err(DomainError::Link(LinkError::InvalidLink));
        }
        Ok(user)
    }

    fn verified_phone(&self, user: &User) -> DomainResult<String> {
        let phone = user
            .phone_number
            .clone()
            .ok_or_else(|| DomainError::Validation {
                message: "No phone number on record".to_string(),
            })?;
        if !is_valid_phone_number(&phone) {
            return Err(DomainError::Validation {
                message: "Stored phone number is not a valid E.164 number".to_string(),
            });
        }
        Ok(phone)
    }

    async fn dispatch_link(
        &self,
        user: &User,
        purpose: LinkPurpose,
        path: &str,
    ) -> DomainResult<LinkDispatchAck> {
        let link = self.links.issue(&user.email, purpose)?;
        let payload = format!(
            "Follow this link to continue: {}/{}?token={}&expiry={}",
            self.frontend_url,
            path,
            link.token,
            link.expires_at.timestamp()
        );

        self.dispatcher
            .send(Channel::Email, &user.email, &payload)
            .await
            .map_err(|e| {
                tracing::error!(
                    email = %mask_email(&user.email),
                    error = %e,
                    event = "link_dispatch_failed",
                    "Failed to dispatch signed link"
                );
                DomainError::Link(LinkError::DispatchFailed)
            })?;

        Ok(LinkDispatchAck {
            email: mask_email(&user.email),
            link_dispatched: true,
        })
    }
}
