//! Operation success payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Acknowledgement returned when a login OTP was dispatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpDispatchAck {
    /// User the pending login belongs to
    pub user_id: Uuid,

    /// Always true on success; dispatch failures surface as errors
    pub otp_dispatched: bool,
}

/// Acknowledgement returned when a signed link was dispatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDispatchAck {
    /// Masked destination address
    pub email: String,

    /// Always true on success; dispatch failures surface as errors
    pub link_dispatched: bool,
}

/// Result of checking a password-reset link without consuming it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetLinkCheck {
    /// Email embedded in the verified link
    pub email: String,
}
