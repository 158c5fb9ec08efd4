//! Console dispatcher for development
//!
//! Logs dispatched messages instead of delivering them, mirroring a
//! console email backend. Useful in development and as the default when
//! no provider credentials are configured.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use vg_core::services::{Channel, MessageDispatcher};
use vg_shared::utils::{mask_email, mask_phone_number};

/// Dispatcher that prints every message to the log
#[derive(Clone)]
pub struct ConsoleDispatcher {
    message_count: Arc<AtomicU64>,
}

impl ConsoleDispatcher {
    pub fn new() -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Total number of messages dispatched
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    fn mask_destination(channel: Channel, destination: &str) -> String {
        match channel {
            Channel::Email => mask_email(destination),
            Channel::Sms => mask_phone_number(destination),
        }
    }
}

impl Default for ConsoleDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageDispatcher for ConsoleDispatcher {
    async fn send(
        &self,
        channel: Channel,
        destination: &str,
        payload: &str,
    ) -> Result<String, String> {
        let message_id = format!("console-{}", Uuid::new_v4());

        info!(
            channel = %channel,
            destination = %Self::mask_destination(channel, destination),
            message_id = %message_id,
            payload = %payload,
            "Dispatched message to console"
        );

        self.message_count.fetch_add(1, Ordering::SeqCst);
        Ok(message_id)
    }
}
