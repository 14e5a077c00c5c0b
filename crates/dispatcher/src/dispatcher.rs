//! The notification dispatcher.

use std::sync::Arc;

use mailer::Email;
use tracing::{info, warn};

use crate::channel::{EmailChannel, SmsChannel};
use crate::error::DispatchError;
use crate::request::{Channel, DeliveryResult, DispatchReport, NotificationRequest, RecipientResult};
use crate::templates::{Rendered, Templates};
use crate::validation::{normalize_email, normalize_phone};

/// Reason reported for recipients the provider refused. Provider detail is logged only.
const PROVIDER_FAILURE: &str = "delivery failed";

/// Renders notifications and hands them to the configured transports.
#[derive(Clone)]
pub struct Dispatcher {
    email: Option<Arc<dyn EmailChannel>>,
    sms: Option<Arc<dyn SmsChannel>>,
    templates: Templates,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Whether a transport is configured for `channel`.
    pub fn supports(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email.is_some(),
            Channel::Sms => self.sms.is_some(),
        }
    }

    /// Send `request` to each of its recipients.
    ///
    /// Returns `Err` only when nothing could be attempted (no transport, no
    /// recipients, template failure). Invalid recipients are marked failed
    /// without a network call; each remaining recipient gets exactly one
    /// send, and one failure never stops the rest.
    pub async fn send(&self, request: &NotificationRequest) -> Result<DispatchReport, DispatchError> {
        if request.recipients.is_empty() {
            return Err(DispatchError::NoRecipients);
        }

        let rendered = self
            .templates
            .render(&request.template, request.locale, &request.substitutions)?;

        let report = match request.channel {
            Channel::Email => {
                let email = self
                    .email
                    .as_ref()
                    .ok_or(DispatchError::ChannelUnavailable("email"))?;
                self.send_emails(email.as_ref(), request, &rendered).await
            }
            Channel::Sms => {
                let sms = self
                    .sms
                    .as_ref()
                    .ok_or(DispatchError::ChannelUnavailable("sms"))?;
                self.send_sms(sms.as_ref(), request, &rendered).await
            }
        };

        info!(
            channel = request.channel.as_str(),
            total = report.total,
            sent = report.sent,
            failed = report.failed,
            "Notification dispatched"
        );

        Ok(report)
    }

    async fn send_emails(
        &self,
        channel: &dyn EmailChannel,
        request: &NotificationRequest,
        rendered: &Rendered,
    ) -> DispatchReport {
        let mut results = Vec::with_capacity(request.recipients.len());
        let mut attempted = 0;

        for recipient in &request.recipients {
            let address = match normalize_email(recipient) {
                Ok(address) => address,
                Err(err) => {
                    warn!(recipient = %recipient, error = %err, "Skipping invalid email recipient");
                    results.push(RecipientResult {
                        recipient: recipient.clone(),
                        normalized: None,
                        result: DeliveryResult::Failed {
                            reason: "invalid email address".to_string(),
                        },
                    });
                    continue;
                }
            };

            let mut email = Email::new(address.clone(), rendered.subject.clone(), rendered.body.clone());
            for cc in &request.cc {
                email.add_cc(cc.clone());
            }
            if let Some(reply_to) = &request.reply_to {
                email.with_reply_to(reply_to.clone());
            }

            attempted += 1;
            let result = match channel.send_email(&email).await {
                Ok(message_id) => DeliveryResult::Delivered { message_id },
                Err(err) => {
                    warn!(recipient = %address, error = %err, "Email delivery failed");
                    DeliveryResult::Failed {
                        reason: PROVIDER_FAILURE.to_string(),
                    }
                }
            };

            results.push(RecipientResult {
                recipient: recipient.clone(),
                normalized: Some(address),
                result,
            });
        }

        DispatchReport::from_results(results, attempted)
    }

    async fn send_sms(
        &self,
        channel: &dyn SmsChannel,
        request: &NotificationRequest,
        rendered: &Rendered,
    ) -> DispatchReport {
        let mut results = Vec::with_capacity(request.recipients.len());
        let mut attempted = 0;

        for recipient in &request.recipients {
            let number = match normalize_phone(recipient) {
                Ok(number) => number,
                Err(_) => {
                    warn!(recipient = %recipient, "Skipping invalid phone recipient");
                    results.push(RecipientResult {
                        recipient: recipient.clone(),
                        normalized: None,
                        result: DeliveryResult::Failed {
                            reason: "invalid phone number".to_string(),
                        },
                    });
                    continue;
                }
            };

            attempted += 1;
            let result = match channel.send_sms(&number, &rendered.body).await {
                Ok(sid) => DeliveryResult::Delivered {
                    message_id: Some(sid),
                },
                Err(err) => {
                    warn!(recipient = %number, error = %err, "SMS delivery failed");
                    DeliveryResult::Failed {
                        reason: PROVIDER_FAILURE.to_string(),
                    }
                }
            };

            results.push(RecipientResult {
                recipient: recipient.clone(),
                normalized: Some(number),
                result,
            });
        }

        DispatchReport::from_results(results, attempted)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("email", &self.email.is_some())
            .field("sms", &self.sms.is_some())
            .finish()
    }
}

/// Builder for [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    email: Option<Arc<dyn EmailChannel>>,
    sms: Option<Arc<dyn SmsChannel>>,
}

impl DispatcherBuilder {
    /// Set the email transport.
    pub fn email(mut self, channel: Arc<dyn EmailChannel>) -> Self {
        self.email = Some(channel);
        self
    }

    /// Set the SMS transport.
    pub fn sms(mut self, channel: Arc<dyn SmsChannel>) -> Self {
        self.sms = Some(channel);
        self
    }

    /// Compile the templates and build the dispatcher.
    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        Ok(Dispatcher {
            email: self.email,
            sms: self.sms,
            templates: Templates::new()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::channel::ChannelError;
    use crate::locale::Locale;
    use crate::templates::TemplateKind;

    #[derive(Default)]
    struct RecordingSms {
        calls: AtomicUsize,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl SmsChannel for RecordingSms {
        async fn send_sms(&self, to: &str, _body: &str) -> Result<String, ChannelError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for.as_deref() == Some(to) {
                return Err(ChannelError::Other("21610: unsubscribed".to_string()));
            }
            Ok(format!("SM{}", n))
        }
    }

    #[derive(Default)]
    struct RecordingEmail {
        sent: Mutex<Vec<Email>>,
    }

    #[async_trait]
    impl EmailChannel for RecordingEmail {
        async fn send_email(&self, email: &Email) -> Result<Option<String>, ChannelError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(None)
        }
    }

    fn bulk(recipients: &[&str]) -> NotificationRequest {
        NotificationRequest::new(
            Channel::Sms,
            recipients.iter().map(|r| r.to_string()).collect(),
            TemplateKind::Custom("Hola {{ name }}".to_string()),
            Locale::Es,
        )
        .with("name", "cliente")
    }

    #[tokio::test]
    async fn test_bulk_sms_skips_invalid_numbers_without_sending() {
        let sms = Arc::new(RecordingSms::default());
        let dispatcher = Dispatcher::builder().sms(sms.clone()).build().unwrap();

        let request = bulk(&["3051234567", "123", "+57 300 123 4567", "not-a-number", "13055550100"]);
        let report = dispatcher.send(&request).await.unwrap();

        assert_eq!(report.results.len(), 5);
        assert_eq!(report.total, 5);
        assert_eq!(report.attempted, 3);
        assert_eq!(sms.calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.sent, 3);
        assert_eq!(report.failed, 2);
        assert_eq!(
            report.results[1].result,
            DeliveryResult::Failed { reason: "invalid phone number".to_string() }
        );
        assert_eq!(report.results[2].normalized.as_deref(), Some("+573001234567"));
    }

    #[tokio::test]
    async fn test_one_provider_failure_does_not_abort_others() {
        let sms = Arc::new(RecordingSms {
            fail_for: Some("+13051234567".to_string()),
            ..Default::default()
        });
        let dispatcher = Dispatcher::builder().sms(sms.clone()).build().unwrap();

        let report = dispatcher
            .send(&bulk(&["3051234567", "3055550100", "3055550101"]))
            .await
            .unwrap();

        assert_eq!(sms.calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 1);
        // Provider detail stays out of the report.
        assert_eq!(
            report.results[0].result,
            DeliveryResult::Failed { reason: PROVIDER_FAILURE.to_string() }
        );
    }

    #[tokio::test]
    async fn test_email_carries_cc_and_reply_to() {
        let email = Arc::new(RecordingEmail::default());
        let dispatcher = Dispatcher::builder().email(email.clone()).build().unwrap();

        let request = NotificationRequest::email("Agent@Example.com", TemplateKind::ContactConfirmation, Locale::En)
            .with("name", "Ana")
            .with_cc("cc@example.com")
            .with_reply_to("ana@x.com");
        let report = dispatcher.send(&request).await.unwrap();

        assert!(report.all_delivered());
        let sent = email.sent.lock().unwrap();
        assert_eq!(sent[0].to, vec!["agent@example.com".to_string()]);
        assert_eq!(sent[0].cc, vec!["cc@example.com".to_string()]);
        assert_eq!(sent[0].reply_to.as_deref(), Some("ana@x.com"));
        assert_eq!(sent[0].subject, "We received your message");
    }

    #[tokio::test]
    async fn test_missing_channel_is_an_error() {
        let dispatcher = Dispatcher::builder().build().unwrap();
        let request = NotificationRequest::email("ana@x.com", TemplateKind::ContactConfirmation, Locale::En)
            .with("name", "Ana");

        let result = dispatcher.send(&request).await;
        assert!(matches!(result, Err(DispatchError::ChannelUnavailable("email"))));
        assert!(!dispatcher.supports(Channel::Email));
    }

    #[tokio::test]
    async fn test_template_error_sends_nothing() {
        let sms = Arc::new(RecordingSms::default());
        let dispatcher = Dispatcher::builder().sms(sms.clone()).build().unwrap();

        let request = NotificationRequest::sms(
            "3051234567",
            TemplateKind::Custom("Hola {{ missing }}".to_string()),
            Locale::Es,
        );
        assert!(matches!(dispatcher.send(&request).await, Err(DispatchError::Template(_))));
        assert_eq!(sms.calls.load(Ordering::SeqCst), 0);
    }
}
