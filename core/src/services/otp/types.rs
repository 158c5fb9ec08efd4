//! Result types for OTP operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Acknowledgement of a dispatched one-time passcode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpDispatch {
    /// Provider message id returned by the dispatcher
    pub message_id: String,

    /// Timestamp when the cached code expires
    pub expires_at: DateTime<Utc>,
}
