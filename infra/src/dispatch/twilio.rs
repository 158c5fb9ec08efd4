//! Twilio SMS dispatcher
//!
//! Sends SMS messages through the Twilio Messages API. Email-channel
//! sends are rejected; pair this dispatcher with an email backend when
//! both channels are needed.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

use vg_core::services::{Channel, MessageDispatcher};
use vg_shared::utils::{is_valid_phone_number, mask_phone_number};

use crate::InfrastructureError;

/// Twilio dispatcher configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,

    /// Twilio Auth Token
    pub auth_token: String,

    /// From phone number (must be a Twilio phone number)
    pub from_number: String,

    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl TwilioConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID")
            .map_err(|_| InfrastructureError::Config("TWILIO_ACCOUNT_SID not set".to_string()))?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN")
            .map_err(|_| InfrastructureError::Config("TWILIO_AUTH_TOKEN not set".to_string()))?;
        let from_number = std::env::var("TWILIO_FROM_NUMBER")
            .map_err(|_| InfrastructureError::Config("TWILIO_FROM_NUMBER not set".to_string()))?;

        if !from_number.starts_with('+') {
            return Err(InfrastructureError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        Ok(Self {
            account_sid,
            auth_token,
            from_number,
            request_timeout_secs: 30,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

/// SMS dispatcher backed by the Twilio Messages API
pub struct TwilioDispatcher {
    http: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioDispatcher {
    /// Create a new Twilio dispatcher
    pub fn new(config: TwilioConfig) -> Result<Self, InfrastructureError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            from = %mask_phone_number(&config.from_number),
            "Twilio dispatcher initialized"
        );

        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(TwilioConfig::from_env()?)
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        )
    }
}

#[async_trait]
impl MessageDispatcher for TwilioDispatcher {
    async fn send(
        &self,
        channel: Channel,
        destination: &str,
        payload: &str,
    ) -> Result<String, String> {
        if channel != Channel::Sms {
            return Err(format!("Twilio dispatcher cannot deliver {} messages", channel));
        }
        if !is_valid_phone_number(destination) {
            return Err(format!(
                "Destination is not a valid E.164 number: {}",
                mask_phone_number(destination)
            ));
        }

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("From", self.config.from_number.as_str()),
                ("To", destination),
                ("Body", payload),
            ])
            .send()
            .await
            .map_err(|e| format!("Twilio request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                destination = %mask_phone_number(destination),
                "Twilio rejected the message"
            );
            return Err(format!("Twilio returned {}: {}", status, body));
        }

        let message: MessageResponse = response
            .json()
            .await
            .map_err(|e| format!("Malformed Twilio response: {}", e))?;

        info!(
            destination = %mask_phone_number(destination),
            message_id = %message.sid,
            "SMS dispatched via Twilio"
        );

        Ok(message.sid)
    }
}
