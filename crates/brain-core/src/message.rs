//! Message types exchanged with a brain.

use serde::{Deserialize, Serialize};

/// A customer text message handed to a brain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Sender address as the provider reports it (e.g. `whatsapp:+13055550100`).
    pub sender: String,
    /// Message text.
    pub text: String,
    /// Conversation topic the reply should stay within.
    pub topic: String,
    /// Profile name shown by the provider, if any.
    pub display_name: Option<String>,
    /// Provider message id, if any.
    pub message_id: Option<String>,
}

impl InboundMessage {
    /// Create a message with no display name or provider id.
    pub fn new(
        sender: impl Into<String>,
        text: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            topic: topic.into(),
            display_name: None,
            message_id: None,
        }
    }

    /// Attach the sender's profile name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Attach the provider message id.
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }
}

/// A reply produced by a brain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Address the reply goes to.
    pub recipient: String,
    /// Reply text.
    pub text: String,
}

impl OutboundMessage {
    /// Build a reply addressed to the sender of `message`.
    pub fn reply_to(message: &InboundMessage, text: impl Into<String>) -> Self {
        Self {
            recipient: message.sender.clone(),
            text: text.into(),
        }
    }
}
