//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use secrecy::SecretString;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Mailboxes and branding.
    pub brokerage: Brokerage,
    /// Bearer token for the messaging endpoint.
    pub messaging_token: Option<SecretString>,
}

/// Internal mailboxes and the name used in customer-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brokerage {
    pub name: String,
    pub email_domain: String,
    /// Receives contact form submissions.
    pub contact_inbox: String,
    /// Receives quote requests.
    pub quote_inbox: String,
    /// Copied on appointment requests routed to a specialist.
    pub appointment_cc: String,
}

impl Brokerage {
    /// Derive every mailbox from one domain.
    pub fn for_domain(name: impl Into<String>, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            name: name.into(),
            contact_inbox: format!("info@{}", domain),
            quote_inbox: format!("quotes@{}", domain),
            appointment_cc: format!("appointments@{}", domain),
            email_domain: domain,
        }
    }

    /// Address at the brokerage domain.
    pub fn mailbox(&self, local_part: &str) -> String {
        format!("{}@{}", local_part, self.email_domain)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `WEB_ADDR` | Server bind address | `127.0.0.1:3000` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:relay.db?mode=rwc` |
    /// | `BROKERAGE_NAME` | Name used in confirmations | generic sign-off |
    /// | `BROKERAGE_EMAIL_DOMAIN` | Domain for internal mailboxes | (required) |
    /// | `CONTACT_INBOX` | Contact form mailbox | `info@<domain>` |
    /// | `QUOTE_INBOX` | Quote request mailbox | `quotes@<domain>` |
    /// | `APPOINTMENT_CC` | CC on specialist appointments | `appointments@<domain>` |
    /// | `MESSAGING_API_TOKEN` | Bearer token for `/api/messages` | (unset disables it) |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("WEB_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            env::var("SQLITE_PATH").unwrap_or_else(|_| database::DEFAULT_DATABASE_URL.to_string());

        let domain = non_empty("BROKERAGE_EMAIL_DOMAIN").ok_or(ConfigError::MissingEmailDomain)?;
        let mut brokerage = Brokerage::for_domain(non_empty("BROKERAGE_NAME").unwrap_or_default(), domain);
        if let Some(inbox) = non_empty("CONTACT_INBOX") {
            brokerage.contact_inbox = inbox;
        }
        if let Some(inbox) = non_empty("QUOTE_INBOX") {
            brokerage.quote_inbox = inbox;
        }
        if let Some(cc) = non_empty("APPOINTMENT_CC") {
            brokerage.appointment_cc = cc;
        }

        let messaging_token = non_empty("MESSAGING_API_TOKEN").map(SecretString::from);

        Ok(Self {
            addr,
            database_url,
            brokerage,
            messaging_token,
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid WEB_ADDR format")]
    InvalidAddr,

    #[error("BROKERAGE_EMAIL_DOMAIN environment variable is required")]
    MissingEmailDomain,
}
