use secrecy::{ExposeSecret, SecretString};
use std::env;

use crate::MailerError;

/// Configuration for the SMTP relay.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP host
    pub smtp_host: String,
    /// SMTP port (default: 587)
    pub smtp_port: u16,
    /// SMTP username
    pub username: String,
    /// SMTP password or API key
    password: SecretString,
    /// Sender mailbox, e.g. `Brokerage <noreply@example.com>`
    pub from: String,
}

impl MailerConfig {
    /// Create a new configuration with explicit values.
    pub fn new(
        smtp_host: impl Into<String>,
        smtp_port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            smtp_port,
            username: username.into(),
            password: SecretString::from(password.into()),
            from: from.into(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `SMTP_HOST` - SMTP relay host
    /// - `SMTP_USERNAME` - SMTP username
    /// - `SMTP_PASSWORD` - SMTP password or provider API key
    /// - `EMAIL_FROM` - Sender mailbox
    ///
    /// Optional (with defaults):
    /// - `SMTP_PORT` - Default: 587
    pub fn from_env() -> Result<Self, MailerError> {
        let smtp_host = required("SMTP_HOST")?;

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|e| MailerError::Config(format!("Invalid SMTP_PORT: {}", e)))?;

        let username = required("SMTP_USERNAME")?;
        let password = required("SMTP_PASSWORD")?;
        let from = required("EMAIL_FROM")?;

        Ok(Self::new(smtp_host, smtp_port, username, password, from))
    }

    /// Get the password (exposes the secret).
    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Builder method to set SMTP port.
    pub fn with_smtp_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }
}

fn required(name: &str) -> Result<String, MailerError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| MailerError::MissingEnvVar(name.to_string()))
}
