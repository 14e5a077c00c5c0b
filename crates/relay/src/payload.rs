//! Provider webhook payloads.

use serde::Deserialize;
use twilio_client::strip_channel_prefix;

/// Form fields posted by the messaging provider.
///
/// Every field is optional on the wire; [`WebhookPayload::parse`] decides
/// once what kind of delivery this is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "From", default)]
    pub from: Option<String>,
    #[serde(rename = "Body", default)]
    pub body: Option<String>,
    #[serde(rename = "MessageSid", default)]
    pub message_sid: Option<String>,
    #[serde(rename = "ProfileName", default)]
    pub profile_name: Option<String>,
    #[serde(rename = "NumMedia", default)]
    pub num_media: Option<String>,
}

/// A text message from a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    /// Address as the provider sent it, e.g. `whatsapp:+13055550100`.
    pub sender_address: String,
    pub body_text: String,
    pub provider_message_id: Option<String>,
    pub display_name: Option<String>,
}

impl WebhookEvent {
    /// The sender's number without a channel prefix; the conversation key.
    pub fn sender_identity(&self) -> &str {
        strip_channel_prefix(&self.sender_address)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookPayload {
    Text(WebhookEvent),
    /// Delivery receipt or media-only message.
    NonText { sender_address: String },
    /// No sender address.
    Malformed,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl WebhookPayload {
    pub fn parse(form: WebhookForm) -> Self {
        let Some(sender_address) = non_blank(form.from) else {
            return WebhookPayload::Malformed;
        };

        match non_blank(form.body) {
            Some(body_text) => WebhookPayload::Text(WebhookEvent {
                sender_address,
                body_text,
                provider_message_id: non_blank(form.message_sid),
                display_name: non_blank(form.profile_name),
            }),
            None => WebhookPayload::NonText { sender_address },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(from: &str, body: &str) -> WebhookForm {
        WebhookForm {
            from: Some(from.to_string()),
            body: Some(body.to_string()),
            message_sid: Some("SM1".to_string()),
            profile_name: Some("Ana".to_string()),
            num_media: None,
        }
    }

    #[test]
    fn test_text_message() {
        let WebhookPayload::Text(event) = WebhookPayload::parse(form("whatsapp:+13055550100", " Hola ")) else {
            panic!("expected text payload");
        };
        assert_eq!(event.body_text, "Hola");
        assert_eq!(event.sender_identity(), "+13055550100");
        assert_eq!(event.provider_message_id.as_deref(), Some("SM1"));
        assert_eq!(event.display_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_empty_body_is_non_text() {
        assert_eq!(
            WebhookPayload::parse(form("whatsapp:+13055550100", "   ")),
            WebhookPayload::NonText {
                sender_address: "whatsapp:+13055550100".to_string()
            }
        );
    }

    #[test]
    fn test_missing_sender_is_malformed() {
        assert_eq!(WebhookPayload::parse(WebhookForm::default()), WebhookPayload::Malformed);
        assert_eq!(WebhookPayload::parse(form("", "Hola")), WebhookPayload::Malformed);
    }
}
