use lettre::{
    message::{Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, instrument};

use crate::{Email, MailerConfig, MailerError};

/// Client for sending email through an SMTP relay.
///
/// Uses connection pooling for efficient batch sending.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a new client with the given configuration.
    pub fn new(config: MailerConfig) -> Result<Self, MailerError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| MailerError::InvalidAddress(format!("From: {}", e)))?;

        let creds = Credentials::new(config.username.clone(), config.password().to_string());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailerError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            from = %from,
            "Created SMTP mailer"
        );

        Ok(Self { transport, from })
    }

    /// Send an email.
    #[instrument(skip(self, email), fields(to = ?email.to, subject = %email.subject))]
    pub async fn send(&self, email: &Email) -> Result<(), MailerError> {
        let message = build_message(&self.from, email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::Send(e.to_string()))?;

        info!(to = ?email.to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

/// Build a lettre Message from our Email type.
fn build_message(from: &Mailbox, email: &Email) -> Result<Message, MailerError> {
    let mut builder = Message::builder().from(from.clone()).subject(&email.subject);

    for to in &email.to {
        let addr = to
            .parse()
            .map_err(|e| MailerError::InvalidAddress(format!("To '{}': {}", to, e)))?;
        builder = builder.to(addr);
    }

    for cc in &email.cc {
        let addr = cc
            .parse()
            .map_err(|e| MailerError::InvalidAddress(format!("CC '{}': {}", cc, e)))?;
        builder = builder.cc(addr);
    }

    if let Some(reply_to) = &email.reply_to {
        let addr = reply_to
            .parse()
            .map_err(|e| MailerError::InvalidAddress(format!("Reply-To '{}': {}", reply_to, e)))?;
        builder = builder.reply_to(addr);
    }

    let message = if let Some(html) = &email.html_body {
        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::plain(email.body.clone()))
                    .singlepart(SinglePart::html(html.clone())),
            )
            .map_err(|e| MailerError::BuildEmail(e.to_string()))?
    } else {
        builder
            .body(email.body.clone())
            .map_err(|e| MailerError::BuildEmail(e.to_string()))?
    };

    Ok(message)
}
