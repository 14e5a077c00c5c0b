//! Configuration types for twilio-client.

use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::error::TwilioError;

/// Default Twilio REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// Configuration for the Messages API.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// REST API base URL.
    pub api_base: String,
    /// Account SID (`AC...`).
    pub account_sid: String,
    /// Auth token.
    auth_token: SecretString,
    /// SMS sender number in E.164.
    pub sms_from: Option<String>,
    /// WhatsApp sender number in E.164 (without the `whatsapp:` prefix).
    pub whatsapp_from: Option<String>,
}

impl TwilioConfig {
    /// Create a configuration with explicit credentials.
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            account_sid: account_sid.into(),
            auth_token: SecretString::from(auth_token.into()),
            sms_from: None,
            whatsapp_from: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `TWILIO_ACCOUNT_SID`
    /// - `TWILIO_AUTH_TOKEN`
    ///
    /// Optional:
    /// - `TWILIO_PHONE_NUMBER` - SMS sender
    /// - `TWILIO_WHATSAPP_NUMBER` - WhatsApp sender
    /// - `TWILIO_API_BASE` - Default: https://api.twilio.com
    pub fn from_env() -> Result<Self, TwilioError> {
        let account_sid = env::var("TWILIO_ACCOUNT_SID")
            .map_err(|_| TwilioError::MissingEnvVar("TWILIO_ACCOUNT_SID".to_string()))?;
        let auth_token = env::var("TWILIO_AUTH_TOKEN")
            .map_err(|_| TwilioError::MissingEnvVar("TWILIO_AUTH_TOKEN".to_string()))?;

        let mut config = Self::new(account_sid, auth_token);
        config.sms_from = env::var("TWILIO_PHONE_NUMBER").ok().filter(|v| !v.is_empty());
        config.whatsapp_from = env::var("TWILIO_WHATSAPP_NUMBER")
            .ok()
            .filter(|v| !v.is_empty());
        if let Ok(base) = env::var("TWILIO_API_BASE") {
            config.api_base = base;
        }

        Ok(config)
    }

    /// Builder method to set the SMS sender.
    pub fn with_sms_from(mut self, number: impl Into<String>) -> Self {
        self.sms_from = Some(number.into());
        self
    }

    /// Builder method to set the WhatsApp sender.
    pub fn with_whatsapp_from(mut self, number: impl Into<String>) -> Self {
        self.whatsapp_from = Some(number.into());
        self
    }

    /// Builder method to set the API base URL.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Get the Messages resource URL for this account.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(&self.account_sid)
        )
    }

    pub(crate) fn auth_token(&self) -> &str {
        self.auth_token.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        let config = TwilioConfig::new("AC123", "secret").with_api_base("http://localhost:4010/");
        assert_eq!(
            config.messages_url(),
            "http://localhost:4010/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = TwilioConfig::new("AC123", "super-secret-token");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-token"));
    }
}
