//! # mailer
//!
//! SMTP client for sending the brokerage's transactional email (internal
//! lead notifications and customer confirmations).
//!
//! ```no_run
//! use mailer::{Email, MailerConfig, SmtpMailer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailer::MailerError> {
//!     let mailer = SmtpMailer::new(MailerConfig::from_env()?)?;
//!
//!     let email = Email::new("ana@example.com", "We received your message", "Thank you!");
//!     mailer.send(&email).await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::SmtpMailer;
pub use config::MailerConfig;
pub use error::MailerError;
pub use types::Email;
