//! Request and response types for the Messages API.

use serde::{Deserialize, Serialize};

/// Form parameters for creating a message.
#[derive(Debug, Clone, Serialize)]
pub struct SendParams {
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "StatusCallback", skip_serializing_if = "Option::is_none")]
    pub status_callback: Option<String>,
}

impl SendParams {
    /// Create params for a plain text message.
    pub fn text(to: impl Into<String>, from: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            body: body.into(),
            status_callback: None,
        }
    }

    /// Ask Twilio to post delivery updates to `url`.
    pub fn with_status_callback(mut self, url: impl Into<String>) -> Self {
        self.status_callback = Some(url.into());
        self
    }
}

/// A created message resource (subset of fields).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResource {
    /// Message SID (`SM...`).
    pub sid: String,
    /// Delivery status (`queued`, `sent`, ...).
    pub status: String,
    /// Recipient as Twilio recorded it.
    pub to: String,
}

/// Error body returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: Option<i64>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_params_form_names() {
        let params = SendParams::text("+13055550100", "+13055550199", "hola");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["To"], "+13055550100");
        assert_eq!(value["From"], "+13055550199");
        assert_eq!(value["Body"], "hola");
        assert!(value.get("StatusCallback").is_none());
    }

    #[test]
    fn test_message_resource_parses() {
        let json = r#"{"sid":"SM1","status":"queued","to":"+13055550100","body":"hi","num_segments":"1"}"#;
        let resource: MessageResource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.sid, "SM1");
        assert_eq!(resource.status, "queued");
    }
}
