//! Operation response envelopes
//!
//! Every orchestrator operation resolves to either a success payload, a
//! plain `{error}` body, or a `{detail, retry_after}` body for the
//! throttled case. These envelopes are wire-format agnostic; an HTTP
//! adapter serializes them as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,

    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Response timestamp
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an error response
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// Extract the data, consuming the response
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// Error body for anticipated client-facing failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code for programmatic handling
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorBody {
    /// Create a new error body
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Error body for throttled requests, carrying the retry hint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottledBody {
    /// Human-readable throttle message
    pub detail: String,

    /// Seconds until the action may be retried
    pub retry_after: i64,
}

impl ThrottledBody {
    /// Create a throttled body from the remaining window
    pub fn new(retry_after: i64) -> Self {
        Self {
            detail: format!(
                "Request was throttled. Expected available in {} seconds.",
                retry_after
            ),
            retry_after,
        }
    }
}
