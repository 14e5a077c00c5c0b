//! Seams between the relay and its storage and outbound channel.

use async_trait::async_trait;
use database::{conversation, processed_message, Database, DatabaseError, MessageClaim, Role};
use twilio_client::{TwilioClient, TwilioError};

/// Conversation persistence used by the relay.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn append_turn(
        &self,
        sender: &str,
        display_name: Option<&str>,
        role: Role,
        content: &str,
    ) -> Result<(), DatabaseError>;

    async fn claim_message(&self, message_sid: &str) -> Result<MessageClaim, DatabaseError>;

    /// Keep the reply for a claimed message until it is delivered.
    async fn store_reply(&self, message_sid: &str, reply: &str) -> Result<(), DatabaseError>;

    async fn mark_sent(&self, message_sid: &str) -> Result<(), DatabaseError>;

    async fn release_message(&self, message_sid: &str) -> Result<(), DatabaseError>;
}

#[async_trait]
impl ConversationStore for Database {
    async fn append_turn(
        &self,
        sender: &str,
        display_name: Option<&str>,
        role: Role,
        content: &str,
    ) -> Result<(), DatabaseError> {
        conversation::append_turn(self.pool(), sender, display_name, role, content).await?;
        Ok(())
    }

    async fn claim_message(&self, message_sid: &str) -> Result<MessageClaim, DatabaseError> {
        processed_message::claim_message(self.pool(), message_sid).await
    }

    async fn store_reply(&self, message_sid: &str, reply: &str) -> Result<(), DatabaseError> {
        processed_message::store_reply(self.pool(), message_sid, reply).await
    }

    async fn mark_sent(&self, message_sid: &str) -> Result<(), DatabaseError> {
        processed_message::mark_sent(self.pool(), message_sid).await
    }

    async fn release_message(&self, message_sid: &str) -> Result<(), DatabaseError> {
        processed_message::release_message(self.pool(), message_sid).await
    }
}

/// Outbound reply channel.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Send `body` to `address` and return the provider message id.
    ///
    /// `address` is the inbound sender address, so a `whatsapp:` sender is
    /// answered on WhatsApp and a bare number by SMS.
    async fn send_reply(&self, address: &str, body: &str) -> Result<String, TwilioError>;
}

#[async_trait]
impl ReplySender for TwilioClient {
    async fn send_reply(&self, address: &str, body: &str) -> Result<String, TwilioError> {
        let message = if address.trim_start().starts_with("whatsapp:") {
            self.send_whatsapp(address, body).await?
        } else {
            self.send_sms(address, body).await?
        };
        Ok(message.sid)
    }
}
