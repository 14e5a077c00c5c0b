//! Notification requests and delivery reports.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::locale::Locale;
use crate::templates::TemplateKind;

/// Transport a notification goes out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }
}

/// One notification: a template rendered for a locale and sent to each recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub channel: Channel,
    pub recipients: Vec<String>,
    /// Copied on every email; ignored for SMS.
    pub cc: Vec<String>,
    /// Reply-To for emails; ignored for SMS.
    pub reply_to: Option<String>,
    pub template: TemplateKind,
    pub locale: Locale,
    pub substitutions: BTreeMap<String, String>,
}

impl NotificationRequest {
    /// An email to a single recipient.
    pub fn email(recipient: impl Into<String>, template: TemplateKind, locale: Locale) -> Self {
        Self::new(Channel::Email, vec![recipient.into()], template, locale)
    }

    /// An SMS to a single recipient.
    pub fn sms(recipient: impl Into<String>, template: TemplateKind, locale: Locale) -> Self {
        Self::new(Channel::Sms, vec![recipient.into()], template, locale)
    }

    /// A notification to many recipients sharing one template.
    pub fn new(
        channel: Channel,
        recipients: Vec<String>,
        template: TemplateKind,
        locale: Locale,
    ) -> Self {
        Self {
            channel,
            recipients,
            cc: Vec::new(),
            reply_to: None,
            template,
            locale,
            substitutions: BTreeMap::new(),
        }
    }

    /// Add a substitution.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.substitutions.insert(key.into(), value.into());
        self
    }

    /// Add a substitution only when `value` is present and non-blank.
    pub fn with_opt(self, key: impl Into<String>, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Merge a map of substitutions.
    pub fn with_all(mut self, values: impl IntoIterator<Item = (String, String)>) -> Self {
        self.substitutions.extend(values);
        self
    }

    /// Copy an address on every email.
    pub fn with_cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Set the Reply-To address.
    pub fn with_reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }
}

/// Outcome for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryResult {
    Delivered {
        #[serde(rename = "messageId", skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
    Failed { reason: String },
}

impl DeliveryResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryResult::Delivered { .. })
    }
}

/// Recipient as given, the normalized address, and what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientResult {
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
    #[serde(flatten)]
    pub result: DeliveryResult,
}

/// Per-recipient results plus aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub results: Vec<RecipientResult>,
    pub total: usize,
    /// Recipients that passed validation and were handed to the transport.
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub(crate) fn from_results(results: Vec<RecipientResult>, attempted: usize) -> Self {
        let sent = results.iter().filter(|r| r.result.is_delivered()).count();
        Self {
            total: results.len(),
            failed: results.len() - sent,
            attempted,
            sent,
            results,
        }
    }

    /// Whether every recipient was delivered.
    pub fn all_delivered(&self) -> bool {
        self.total > 0 && self.failed == 0
    }

    /// Some, but not all, recipients failed.
    pub fn is_partial(&self) -> bool {
        self.sent > 0 && self.failed > 0
    }

    /// Provider message id of the first delivered recipient.
    pub fn first_message_id(&self) -> Option<&str> {
        self.results.iter().find_map(|r| match &r.result {
            DeliveryResult::Delivered { message_id } => message_id.as_deref(),
            DeliveryResult::Failed { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_opt_skips_blank() {
        let request = NotificationRequest::email("ana@x.com", TemplateKind::ContactConfirmation, Locale::Es)
            .with_opt("phone", Some("   "))
            .with_opt("message", None)
            .with_opt("subject", Some(" Auto "));

        assert!(!request.substitutions.contains_key("phone"));
        assert!(!request.substitutions.contains_key("message"));
        assert_eq!(request.substitutions["subject"], "Auto");
    }

    #[test]
    fn test_report_counts() {
        let results = vec![
            RecipientResult {
                recipient: "a".into(),
                normalized: Some("+13051234567".into()),
                result: DeliveryResult::Delivered { message_id: Some("SM1".into()) },
            },
            RecipientResult {
                recipient: "b".into(),
                normalized: None,
                result: DeliveryResult::Failed { reason: "invalid phone number".into() },
            },
        ];
        let report = DispatchReport::from_results(results, 1);

        assert_eq!(report.total, 2);
        assert_eq!(report.sent, 1);
        assert_eq!(report.failed, 1);
        assert!(report.is_partial());
        assert!(!report.all_delivered());
        assert_eq!(report.first_message_id(), Some("SM1"));
    }

    #[test]
    fn test_result_serialization() {
        let result = RecipientResult {
            recipient: "3051234567".into(),
            normalized: Some("+13051234567".into()),
            result: DeliveryResult::Delivered { message_id: Some("SM1".into()) },
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "delivered");
        assert_eq!(value["messageId"], "SM1");
        assert_eq!(value["normalized"], "+13051234567");
    }
}
