//! Throttle guard implementation

use std::fmt;
use std::sync::Arc;

use vg_shared::config::ThrottleConfig;

use crate::errors::{AuthError, DomainError, DomainResult};
use crate::services::cache::CacheStore;

/// Named rate-limit bucket, keyed additionally by requester identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleScope {
    /// Login and resend OTP dispatches, keyed by user id
    Otp,
    /// Email-verification link dispatches, keyed by email
    EmailVerify,
    /// Phone OTP dispatches, keyed by phone number
    PhoneOtp,
    /// Password-reset link dispatches, keyed by email
    PasswordReset,
}

impl ThrottleScope {
    /// Scope segment used in marker keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ThrottleScope::Otp => "otp",
            ThrottleScope::EmailVerify => "email_verify",
            ThrottleScope::PhoneOtp => "phone_otp",
            ThrottleScope::PasswordReset => "password_reset",
        }
    }

    fn window_seconds(&self, config: &ThrottleConfig) -> u64 {
        match self {
            ThrottleScope::Otp => config.otp_window_seconds,
            ThrottleScope::EmailVerify => config.email_verify_window_seconds,
            ThrottleScope::PhoneOtp => config.phone_otp_window_seconds,
            ThrottleScope::PasswordReset => config.password_reset_window_seconds,
        }
    }
}

impl fmt::Display for ThrottleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guard enforcing a minimum inter-request interval per (scope, identity)
///
/// The marker is written before any externally visible side effect, so a
/// throttled request never triggers a duplicate dispatch.
pub struct ThrottleGuard<C: CacheStore> {
    cache: Arc<C>,
    config: ThrottleConfig,
}

impl<C: CacheStore> ThrottleGuard<C> {
    pub fn new(cache: Arc<C>, config: ThrottleConfig) -> Self {
        Self { cache, config }
    }

    fn marker_key(scope: ThrottleScope, identity: &str) -> String {
        format!("throttle:{}:{}", scope.as_str(), identity)
    }

    /// Remaining seconds of an active marker, `None` when the identity
    /// may proceed
    pub async fn check(&self, scope: ThrottleScope, identity: &str) -> DomainResult<Option<i64>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let key = Self::marker_key(scope, identity);
        let remaining = self
            .cache
            .ttl(&key)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to check throttle marker: {}", e),
            })?;
        Ok(remaining.filter(|r| *r > 0))
    }

    /// Write the marker for a successful pass through the guard
    pub async fn start(&self, scope: ThrottleScope, identity: &str) -> DomainResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let key = Self::marker_key(scope, identity);
        self.cache
            .set(&key, "1", scope.window_seconds(&self.config))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to set throttle marker: {}", e),
            })
    }

    /// Check-then-act pass through the guard
    ///
    /// Fails with `Throttled { retry_after }` while a marker is active,
    /// otherwise writes a fresh marker and lets the caller proceed to
    /// its side effect.
    pub async fn acquire(&self, scope: ThrottleScope, identity: &str) -> DomainResult<()> {
        if let Some(retry_after) = self.check(scope, identity).await? {
            tracing::warn!(
                scope = scope.as_str(),
                retry_after,
                event = "rate_limit_exceeded",
                "Request rejected by throttle guard"
            );
            return Err(DomainError::Auth(AuthError::Throttled { retry_after }));
        }
        self.start(scope, identity).await
    }
}
