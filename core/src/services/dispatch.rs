//! Message dispatch abstraction for OTP and signed-link delivery

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

/// Delivery channel for a dispatched message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Sms,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Email => f.write_str("email"),
            Channel::Sms => f.write_str("sms"),
        }
    }
}

/// Trait for external message delivery (email/SMS senders)
///
/// Returns the provider message id on success. The error string is the
/// provider's failure description; callers translate it into the flow's
/// dispatch error.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    async fn send(&self, channel: Channel, destination: &str, payload: &str)
        -> Result<String, String>;
}

/// Recording dispatcher for tests and development
///
/// Captures every dispatched message instead of sending it and can be
/// switched into a failing mode to exercise dispatch-failure paths.
pub struct MockDispatcher {
    /// Messages captured so far as (channel, destination, payload)
    pub sent: Arc<Mutex<Vec<(Channel, String, String)>>>,
    counter: AtomicU64,
    fail: bool,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            counter: AtomicU64::new(0),
            fail: false,
        }
    }

    /// A dispatcher whose every send fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Number of messages dispatched so far
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Payload of the most recent dispatch
    pub fn last_payload(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, _, p)| p.clone())
    }

    /// Extract the first run of ASCII digits from the last payload
    ///
    /// Convenience for tests that need the OTP that was "sent".
    pub fn last_code(&self) -> Option<String> {
        let payload = self.last_payload()?;
        let digits: String = payload
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        (!digits.is_empty()).then_some(digits)
    }
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageDispatcher for MockDispatcher {
    async fn send(
        &self,
        channel: Channel,
        destination: &str,
        payload: &str,
    ) -> Result<String, String> {
        if self.fail {
            return Err("simulated dispatch failure".to_string());
        }
        self.sent.lock().unwrap().push((
            channel,
            destination.to_string(),
            payload.to_string(),
        ));
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("mock-message-{}", id))
    }
}
