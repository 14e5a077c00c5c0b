//! Transport seams for the dispatcher.

use async_trait::async_trait;
use mailer::{Email, MailerError, SmtpMailer};
use thiserror::Error;
use twilio_client::{TwilioClient, TwilioError};

/// Error returned by a transport for one message.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error(transparent)]
    Email(#[from] MailerError),

    #[error(transparent)]
    Sms(#[from] TwilioError),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Something that can deliver one email.
#[async_trait]
pub trait EmailChannel: Send + Sync {
    /// Deliver `email`, returning a provider message id when one exists.
    async fn send_email(&self, email: &Email) -> Result<Option<String>, ChannelError>;
}

/// Something that can deliver one SMS.
#[async_trait]
pub trait SmsChannel: Send + Sync {
    /// Deliver `body` to the E.164 number `to`, returning the provider message id.
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, ChannelError>;
}

#[async_trait]
impl EmailChannel for SmtpMailer {
    async fn send_email(&self, email: &Email) -> Result<Option<String>, ChannelError> {
        self.send(email).await?;
        Ok(None)
    }
}

#[async_trait]
impl SmsChannel for TwilioClient {
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, ChannelError> {
        let message = TwilioClient::send_sms(self, to, body).await?;
        Ok(message.sid)
    }
}
