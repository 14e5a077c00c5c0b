use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::CrmError;

pub const DEFAULT_API_URL: &str = "https://api.hubapi.com";

/// HubSpot private-app configuration.
#[derive(Debug, Clone)]
pub struct HubspotConfig {
    pub api_url: String,
    api_key: SecretString,
}

impl HubspotConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// Reads `HUBSPOT_API_KEY` (required) and `HUBSPOT_API_URL` (optional).
    pub fn from_env() -> Result<Self, CrmError> {
        let key = env::var("HUBSPOT_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| CrmError::MissingEnvVar("HUBSPOT_API_KEY".to_string()))?;

        let mut config = Self::new(key);
        if let Ok(url) = env::var("HUBSPOT_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}
