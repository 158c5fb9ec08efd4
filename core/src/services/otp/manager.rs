//! OTP manager implementation

use std::sync::Arc;

use chrono::{Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;

use vg_shared::config::OtpConfig;
use vg_shared::utils::{mask_email, mask_phone_number};

use crate::domain::entities::user::User;
use crate::errors::{DomainError, DomainResult, OtpError};
use crate::services::cache::CacheStore;
use crate::services::dispatch::{Channel, MessageDispatcher};

use super::types::OtpDispatch;

/// Manager for numeric one-time passcodes tied to a subject
///
/// Login codes are keyed by user id together with the re-cached
/// credentials of the pending login; phone codes are keyed by phone
/// number. All entries expire through the cache store's TTL.
pub struct OtpManager<C: CacheStore, D: MessageDispatcher> {
    cache: Arc<C>,
    dispatcher: Arc<D>,
    config: OtpConfig,
}

impl<C: CacheStore, D: MessageDispatcher> OtpManager<C, D> {
    pub fn new(cache: Arc<C>, dispatcher: Arc<D>, config: OtpConfig) -> Self {
        Self {
            cache,
            dispatcher,
            config,
        }
    }

    fn otp_key(user_id: Uuid) -> String {
        format!("login:otp:{}", user_id)
    }

    fn email_key(user_id: Uuid) -> String {
        format!("login:email:{}", user_id)
    }

    fn password_key(user_id: Uuid) -> String {
        format!("login:password:{}", user_id)
    }

    fn phone_key(phone: &str) -> String {
        format!("phone:otp:{}", phone)
    }

    /// Generate a cryptographically secure random numeric code
    ///
    /// Uses the OS CSPRNG; the modulo bias over a 6-digit range is
    /// negligible.
    pub fn generate_code(&self) -> String {
        let mut bytes = [0u8; 4];
        OsRng.fill_bytes(&mut bytes);
        let num = u32::from_le_bytes(bytes);
        let modulus = 10u32.pow(self.config.code_length as u32);
        format!("{:0width$}", num % modulus, width = self.config.code_length)
    }

    /// Codes are compared as fixed-width strings; anything that is not
    /// exactly `code_length` ASCII digits can never match
    fn is_well_formed(&self, candidate: &str) -> bool {
        candidate.len() == self.config.code_length
            && candidate.chars().all(|c| c.is_ascii_digit())
    }

    fn internal(context: &str, error: String) -> DomainError {
        DomainError::Internal {
            message: format!("{}: {}", context, error),
        }
    }

    /// Start a pending login: dispatch a fresh code and cache the
    /// OTP together with the submitted credentials
    ///
    /// The credential markers outlive the code so the exchange step can
    /// re-validate the original credentials without re-submission. On a
    /// dispatch failure no cache entry is created; on a cache failure
    /// the partial entries are rolled back.
    pub async fn start_login_session(
        &self,
        user: &User,
        password: &str,
    ) -> DomainResult<OtpDispatch> {
        let code = self.generate_code();
        let payload = format!(
            "Your Verigate verification code is {}. It expires in {} minutes.",
            code,
            self.config.otp_ttl_seconds / 60
        );

        let message_id = self
            .dispatcher
            .send(Channel::Email, &user.email, &payload)
            .await
            .map_err(|e| {
                tracing::error!(
                    email = %mask_email(&user.email),
                    error = %e,
                    event = "otp_dispatch_failed",
                    "Failed to dispatch login code"
                );
                DomainError::Otp(OtpError::DispatchFailed)
            })?;

        if let Err(error) = self.cache_login_entries(user, &code, password).await {
            self.clear_login_session(user.id).await;
            return Err(error);
        }

        tracing::info!(
            user_id = %user.id,
            email = %mask_email(&user.email),
            event = "otp_generated",
            "Dispatched login code and cached pending login"
        );

        Ok(OtpDispatch {
            message_id,
            expires_at: Utc::now() + Duration::seconds(self.config.otp_ttl_seconds as i64),
        })
    }

    async fn cache_login_entries(
        &self,
        user: &User,
        code: &str,
        password: &str,
    ) -> DomainResult<()> {
        self.cache
            .set(&Self::otp_key(user.id), code, self.config.otp_ttl_seconds)
            .await
            .map_err(|e| Self::internal("Failed to cache login code", e))?;
        self.cache
            .set(
                &Self::email_key(user.id),
                &user.email,
                self.config.session_ttl_seconds,
            )
            .await
            .map_err(|e| Self::internal("Failed to cache login email", e))?;
        self.cache
            .set(
                &Self::password_key(user.id),
                password,
                self.config.session_ttl_seconds,
            )
            .await
            .map_err(|e| Self::internal("Failed to cache login password", e))?;
        Ok(())
    }

    /// Re-dispatch a code for an existing pending login
    ///
    /// Requires the cached credential markers to still be present; the
    /// resend path never sees the password again. Marker TTLs are
    /// refreshed alongside the new code.
    pub async fn reissue_login_otp(&self, user: &User) -> DomainResult<OtpDispatch> {
        let email = self
            .cache
            .get(&Self::email_key(user.id))
            .await
            .map_err(|e| Self::internal("Failed to read login session", e))?
            .ok_or(DomainError::Otp(OtpError::SessionExpired))?;
        let password = self
            .cache
            .get(&Self::password_key(user.id))
            .await
            .map_err(|e| Self::internal("Failed to read login session", e))?
            .ok_or(DomainError::Otp(OtpError::SessionExpired))?;

        let code = self.generate_code();
        let payload = format!(
            "Your Verigate verification code is {}. It expires in {} minutes.",
            code,
            self.config.otp_ttl_seconds / 60
        );

        let message_id = self
            .dispatcher
            .send(Channel::Email, &email, &payload)
            .await
            .map_err(|e| {
                tracing::error!(
                    email = %mask_email(&email),
                    error = %e,
                    event = "otp_dispatch_failed",
                    "Failed to re-dispatch login code"
                );
                DomainError::Otp(OtpError::DispatchFailed)
            })?;

        self.cache
            .set(&Self::otp_key(user.id), &code, self.config.otp_ttl_seconds)
            .await
            .map_err(|e| Self::internal("Failed to cache login code", e))?;
        self.cache
            .set(
                &Self::email_key(user.id),
                &email,
                self.config.session_ttl_seconds,
            )
            .await
            .map_err(|e| Self::internal("Failed to refresh login session", e))?;
        self.cache
            .set(
                &Self::password_key(user.id),
                &password,
                self.config.session_ttl_seconds,
            )
            .await
            .map_err(|e| Self::internal("Failed to refresh login session", e))?;

        tracing::info!(
            user_id = %user.id,
            event = "otp_reissued",
            "Re-dispatched login code"
        );

        Ok(OtpDispatch {
            message_id,
            expires_at: Utc::now() + Duration::seconds(self.config.otp_ttl_seconds as i64),
        })
    }

    /// Verify and consume the login code of a pending login
    ///
    /// All three cached entries must still exist. The match is a
    /// constant-time comparison of fixed-width strings, and consumption
    /// is the atomic delete of the code: a concurrent duplicate request
    /// observes the entry already gone and fails closed.
    pub async fn verify_login_otp(&self, user_id: Uuid, candidate: &str) -> DomainResult<()> {
        let stored = self
            .cache
            .get(&Self::otp_key(user_id))
            .await
            .map_err(|e| Self::internal("Failed to read login code", e))?
            .ok_or(DomainError::Otp(OtpError::SessionExpired))?;

        let email_present = self
            .cache
            .exists(&Self::email_key(user_id))
            .await
            .map_err(|e| Self::internal("Failed to read login session", e))?;
        let password_present = self
            .cache
            .exists(&Self::password_key(user_id))
            .await
            .map_err(|e| Self::internal("Failed to read login session", e))?;
        if !email_present || !password_present {
            return Err(DomainError::Otp(OtpError::SessionExpired));
        }

        if !self.is_well_formed(candidate)
            || !constant_time_eq(stored.as_bytes(), candidate.as_bytes())
        {
            tracing::warn!(
                user_id = %user_id,
                event = "otp_verification_failed",
                "Login code mismatch"
            );
            return Err(DomainError::Otp(OtpError::InvalidOtp));
        }

        let consumed = self
            .cache
            .delete(&Self::otp_key(user_id))
            .await
            .map_err(|e| Self::internal("Failed to consume login code", e))?;
        if !consumed {
            // Lost the consume race to a concurrent exchange
            return Err(DomainError::Otp(OtpError::SessionExpired));
        }

        tracing::info!(
            user_id = %user_id,
            event = "otp_verified_success",
            "Login code verified and consumed"
        );
        Ok(())
    }

    /// Read the cached credentials of a pending login
    pub async fn cached_credentials(&self, user_id: Uuid) -> DomainResult<(String, String)> {
        let email = self
            .cache
            .get(&Self::email_key(user_id))
            .await
            .map_err(|e| Self::internal("Failed to read login session", e))?
            .ok_or(DomainError::Otp(OtpError::SessionExpired))?;
        let password = self
            .cache
            .get(&Self::password_key(user_id))
            .await
            .map_err(|e| Self::internal("Failed to read login session", e))?
            .ok_or(DomainError::Otp(OtpError::SessionExpired))?;
        Ok((email, password))
    }

    /// Drop all entries of a pending login, best effort
    pub async fn clear_login_session(&self, user_id: Uuid) {
        let _ = self.cache.delete(&Self::otp_key(user_id)).await;
        let _ = self.cache.delete(&Self::email_key(user_id)).await;
        let _ = self.cache.delete(&Self::password_key(user_id)).await;
    }

    /// Dispatch and cache a phone verification code
    pub async fn start_phone_verification(&self, phone: &str) -> DomainResult<OtpDispatch> {
        let code = self.generate_code();
        let payload = format!("Your Verigate verification code is {}", code);

        let message_id = self
            .dispatcher
            .send(Channel::Sms, phone, &payload)
            .await
            .map_err(|e| {
                tracing::error!(
                    phone = %mask_phone_number(phone),
                    error = %e,
                    event = "otp_dispatch_failed",
                    "Failed to dispatch phone code"
                );
                DomainError::Otp(OtpError::DispatchFailed)
            })?;

        self.cache
            .set(&Self::phone_key(phone), &code, self.config.otp_ttl_seconds)
            .await
            .map_err(|e| Self::internal("Failed to cache phone code", e))?;

        tracing::info!(
            phone = %mask_phone_number(phone),
            event = "otp_generated",
            "Dispatched phone verification code"
        );

        Ok(OtpDispatch {
            message_id,
            expires_at: Utc::now() + Duration::seconds(self.config.otp_ttl_seconds as i64),
        })
    }

    /// Verify and consume a phone verification code
    pub async fn verify_phone_otp(&self, phone: &str, candidate: &str) -> DomainResult<()> {
        let stored = self
            .cache
            .get(&Self::phone_key(phone))
            .await
            .map_err(|e| Self::internal("Failed to read phone code", e))?
            .ok_or(DomainError::Otp(OtpError::SessionExpired))?;

        if !self.is_well_formed(candidate)
            || !constant_time_eq(stored.as_bytes(), candidate.as_bytes())
        {
            tracing::warn!(
                phone = %mask_phone_number(phone),
                event = "otp_verification_failed",
                "Phone code mismatch"
            );
            return Err(DomainError::Otp(OtpError::InvalidOtp));
        }

        let consumed = self
            .cache
            .delete(&Self::phone_key(phone))
            .await
            .map_err(|e| Self::internal("Failed to consume phone code", e))?;
        if !consumed {
            return Err(DomainError::Otp(OtpError::SessionExpired));
        }

        tracing::info!(
            phone = %mask_phone_number(phone),
            event = "otp_verified_success",
            "Phone code verified and consumed"
        );
        Ok(())
    }
}
