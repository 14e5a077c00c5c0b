use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::VerificationError;

/// Cloudflare's verification endpoint.
pub const DEFAULT_VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Turnstile configuration.
#[derive(Debug, Clone)]
pub struct TurnstileConfig {
    /// Verification endpoint.
    pub verify_url: String,
    secret_key: SecretString,
}

impl TurnstileConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `TURNSTILE_SECRET_KEY`
    ///
    /// Optional:
    /// - `TURNSTILE_VERIFY_URL` - Default: Cloudflare siteverify
    pub fn from_env() -> Result<Self, VerificationError> {
        let secret = env::var("TURNSTILE_SECRET_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| VerificationError::MissingEnvVar("TURNSTILE_SECRET_KEY".to_string()))?;

        let mut config = Self::new(secret);
        if let Ok(url) = env::var("TURNSTILE_VERIFY_URL") {
            config.verify_url = url;
        }
        Ok(config)
    }

    /// Builder method to set the verification endpoint.
    pub fn with_verify_url(mut self, url: impl Into<String>) -> Self {
        self.verify_url = url.into();
        self
    }

    pub(crate) fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}
