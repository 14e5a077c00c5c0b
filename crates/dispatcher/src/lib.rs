//! Notification dispatch for the brokerage's forms and messaging tools.
//!
//! A [`NotificationRequest`] names a channel, one or more recipients, a
//! template, a locale, and the substitutions to render. The [`Dispatcher`]
//! validates every recipient locally, renders the template once, and sends
//! one message per recipient. A failure for one recipient never stops the
//! others; the caller gets a [`DispatchReport`] with per-recipient results.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dispatcher::{Dispatcher, Locale, NotificationRequest, TemplateKind};
//! use mailer::{MailerConfig, SmtpMailer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mailer = SmtpMailer::new(MailerConfig::from_env()?)?;
//! let dispatcher = Dispatcher::builder().email(Arc::new(mailer)).build()?;
//!
//! let request = NotificationRequest::email("ana@example.com", TemplateKind::ContactConfirmation, Locale::Es)
//!     .with("name", "Ana")
//!     .with("brokerage_name", "Seguros del Sol");
//! let report = dispatcher.send(&request).await?;
//! assert_eq!(report.sent, 1);
//! # Ok(())
//! # }
//! ```

mod channel;
mod dispatcher;
mod error;
mod locale;
mod request;
mod templates;
pub mod validation;

pub use channel::{ChannelError, EmailChannel, SmsChannel};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::DispatchError;
pub use locale::Locale;
pub use request::{
    Channel, DeliveryResult, DispatchReport, NotificationRequest, RecipientResult,
};
pub use templates::{Rendered, TemplateKind, Templates};
