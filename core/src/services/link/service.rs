//! Signed link issuance and verification

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use vg_shared::config::SignedLinkConfig;
use vg_shared::utils::mask_email;

use crate::errors::{DomainError, DomainResult, LinkError};

type HmacSha256 = Hmac<Sha256>;

/// Purpose a signed link was issued for
///
/// A token is only valid for the purpose it was issued with; an
/// email-verification token replayed against the password-reset flow is
/// rejected as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPurpose {
    EmailVerify,
    PasswordReset,
}

/// A freshly issued signed link
#[derive(Debug, Clone)]
pub struct IssuedLink {
    /// Opaque token carrying the signed payload
    pub token: String,

    /// Expiry timestamp that must accompany the token
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct LinkPayload {
    email: String,
    purpose: LinkPurpose,
}

/// Issuer and verifier of tamper-evident, self-expiring link tokens
///
/// A token is `base64url(payload) "." base64url(mac)` where the MAC
/// covers both the payload and the expiry timestamp that travels beside
/// the token. Validity is a function of the token's own content and the
/// current time; no server-side state is involved.
pub struct SignedLinkService {
    secret: Vec<u8>,
    lifetime_minutes: i64,
}

impl SignedLinkService {
    pub fn new(config: &SignedLinkConfig) -> Self {
        Self {
            secret: config.secret.as_bytes().to_vec(),
            lifetime_minutes: config.lifetime_minutes,
        }
    }

    fn mac(&self, payload_b64: &str, expiry_ts: i64) -> DomainResult<Vec<u8>> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|e| DomainError::Internal {
                message: format!("Failed to initialize link MAC: {}", e),
            })?;
        mac.update(payload_b64.as_bytes());
        mac.update(b".");
        mac.update(expiry_ts.to_string().as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Issue a signed link for an email and purpose
    pub fn issue(&self, email: &str, purpose: LinkPurpose) -> DomainResult<IssuedLink> {
        let expires_at = Utc::now() + Duration::minutes(self.lifetime_minutes);
        let payload = serde_json::to_vec(&LinkPayload {
            email: email.to_string(),
            purpose,
        })
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to encode link payload: {}", e),
        })?;

        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let signature = self.mac(&payload_b64, expires_at.timestamp())?;
        let token = format!("{}.{}", payload_b64, URL_SAFE_NO_PAD.encode(signature));

        tracing::info!(
            email = %mask_email(email),
            purpose = ?purpose,
            event = "link_issued",
            "Issued signed link"
        );

        Ok(IssuedLink { token, expires_at })
    }

    /// Verify a signed link and return the embedded email
    ///
    /// Fails with `MissingLink` when either parameter is absent,
    /// `LinkExpired` when the expiry timestamp is in the past, and
    /// `InvalidLink` when the token is malformed, tampered with, or was
    /// issued for a different purpose. The caller re-resolves the user
    /// and re-checks account state as appropriate to the purpose.
    pub fn verify(
        &self,
        token: Option<&str>,
        expiry: Option<&str>,
        purpose: LinkPurpose,
    ) -> DomainResult<String> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(DomainError::Link(LinkError::MissingLink)),
        };
        let expiry = match expiry {
            Some(e) if !e.is_empty() => e,
            _ => return Err(DomainError::Link(LinkError::MissingLink)),
        };

        let expiry_ts: i64 = expiry
            .parse()
            .map_err(|_| DomainError::Link(LinkError::InvalidLink))?;
        if expiry_ts < Utc::now().timestamp() {
            return Err(DomainError::Link(LinkError::LinkExpired));
        }

        let (payload_b64, signature_b64) = token
            .split_once('.')
            .ok_or(DomainError::Link(LinkError::InvalidLink))?;
        let presented = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| DomainError::Link(LinkError::InvalidLink))?;
        let expected = self.mac(payload_b64, expiry_ts)?;
        if !constant_time_eq(&presented, &expected) {
            return Err(DomainError::Link(LinkError::InvalidLink));
        }

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| DomainError::Link(LinkError::InvalidLink))?;
        let payload: LinkPayload = serde_json::from_slice(&payload_bytes)
            .map_err(|_| DomainError::Link(LinkError::InvalidLink))?;
        if payload.purpose != purpose {
            return Err(DomainError::Link(LinkError::InvalidLink));
        }

        tracing::info!(
            email = %mask_email(&payload.email),
            purpose = ?purpose,
            event = "link_verified",
            "Verified signed link"
        );

        Ok(payload.email)
    }
}
