//! Twilio Messages API HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

use crate::config::TwilioConfig;
use crate::error::TwilioError;
use crate::phone::{format_phone_number, whatsapp_address};
use crate::types::{ApiErrorBody, MessageResource, SendParams};

/// Client for the Twilio Messages API.
#[derive(Clone)]
pub struct TwilioClient {
    http: Client,
    config: TwilioConfig,
}

impl TwilioClient {
    /// Create a client. No request is made until the first send.
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(TwilioError::Http)?;

        info!(account = %config.account_sid, "Created Twilio client");

        Ok(Self { http, config })
    }

    /// Send an SMS from the configured SMS sender.
    ///
    /// `to` is normalized with [`format_phone_number`] first.
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<MessageResource, TwilioError> {
        let from = self
            .config
            .sms_from
            .clone()
            .ok_or(TwilioError::MissingSender("sms"))?;
        let to = format_phone_number(to).ok_or_else(|| TwilioError::InvalidNumber(to.to_string()))?;

        self.send(SendParams::text(to, from, body)).await
    }

    /// Send a WhatsApp message from the configured WhatsApp sender.
    ///
    /// `to` may carry the `whatsapp:` prefix or not.
    pub async fn send_whatsapp(&self, to: &str, body: &str) -> Result<MessageResource, TwilioError> {
        let from = self
            .config
            .whatsapp_from
            .as_deref()
            .map(whatsapp_address)
            .ok_or(TwilioError::MissingSender("whatsapp"))?;

        self.send(SendParams::text(whatsapp_address(to), from, body)).await
    }

    /// Create a message with explicit parameters.
    pub async fn send(&self, params: SendParams) -> Result<MessageResource, TwilioError> {
        let url = self.config.messages_url();
        debug!(to = %params.to, "Creating Twilio message");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(self.config.auth_token()))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(err) => (err.code.unwrap_or_default(), err.message),
                Err(_) => (0, body),
            };
            return Err(TwilioError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let resource: MessageResource = serde_json::from_str(&body)?;
        info!(sid = %resource.sid, to = %resource.to, status = %resource.status, "Twilio message created");
        Ok(resource)
    }

    /// Get the configuration.
    pub fn config(&self) -> &TwilioConfig {
        &self.config
    }
}

impl std::fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioClient")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_sms_requires_sender() {
        let client = TwilioClient::new(TwilioConfig::new("AC123", "token")).unwrap();
        let result = client.send_sms("3051234567", "hi").await;
        assert!(matches!(result, Err(TwilioError::MissingSender("sms"))));
    }

    #[tokio::test]
    async fn test_send_sms_rejects_invalid_number_locally() {
        // Unroutable base: reaching the network would yield an Http error instead.
        let config = TwilioConfig::new("AC123", "token")
            .with_sms_from("+13055550199")
            .with_api_base("http://127.0.0.1:9");
        let client = TwilioClient::new(config).unwrap();

        let result = client.send_sms("12345", "hi").await;
        assert!(matches!(result, Err(TwilioError::InvalidNumber(_))));
    }

    #[tokio::test]
    async fn test_send_whatsapp_requires_sender() {
        let client = TwilioClient::new(TwilioConfig::new("AC123", "token")).unwrap();
        let result = client.send_whatsapp("whatsapp:+13051234567", "hi").await;
        assert!(matches!(result, Err(TwilioError::MissingSender("whatsapp"))));
    }
}
