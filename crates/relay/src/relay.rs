//! The relay state machine.

use std::sync::Arc;
use std::time::Duration;

use brain_core::{Brain, BrainError, InboundMessage};
use database::{MessageClaim, Role};
use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use twilio_client::TwilioError;

use crate::payload::{WebhookEvent, WebhookPayload};
use crate::store::{ConversationStore, ReplySender};

/// Topic the brain is asked to stay within when none is configured.
pub const DEFAULT_TOPIC: &str = "insurance";

/// Default timeout for brain processing (60 seconds).
const DEFAULT_BRAIN_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Conversation topic passed to the brain with every message.
    pub topic: String,

    /// Upper bound on one brain call.
    pub brain_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            brain_timeout: DEFAULT_BRAIN_TIMEOUT,
        }
    }
}

impl RelayConfig {
    /// Reads `RELAY_TOPIC`, falling back to [`DEFAULT_TOPIC`].
    pub fn from_env() -> Self {
        let topic = std::env::var("RELAY_TOPIC")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        Self {
            topic,
            ..Default::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("brain error: {0}")]
    Brain(#[from] BrainError),

    #[error("brain processing timed out after {0:?}")]
    Timeout(Duration),

    #[error("reply delivery failed: {0}")]
    Reply(#[from] TwilioError),
}

/// How one webhook delivery ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RelayOutcome {
    /// Reply sent to the sender.
    Replied {
        to: String,
        #[serde(rename = "messageSid")]
        message_sid: String,
    },
    /// Nothing to answer; no brain call and no writes.
    Ignored { reason: &'static str },
    /// Provider redelivery of a message already handled.
    Duplicate {
        #[serde(rename = "messageSid")]
        message_sid: String,
    },
}

/// Turns webhook deliveries into stored exchanges and replies.
pub struct MessageRelay {
    brain: Arc<dyn Brain>,
    store: Arc<dyn ConversationStore>,
    replies: Arc<dyn ReplySender>,
    config: RelayConfig,
}

impl MessageRelay {
    pub fn new(
        brain: Arc<dyn Brain>,
        store: Arc<dyn ConversationStore>,
        replies: Arc<dyn ReplySender>,
        config: RelayConfig,
    ) -> Self {
        Self {
            brain,
            store,
            replies,
            config,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn brain_name(&self) -> &str {
        self.brain.name()
    }

    /// Handle one parsed webhook delivery.
    pub async fn handle(&self, payload: WebhookPayload) -> Result<RelayOutcome, RelayError> {
        let event = match payload {
            WebhookPayload::Text(event) => event,
            WebhookPayload::NonText { sender_address } => {
                debug!(sender = %sender_address, "Ignoring non-text webhook");
                return Ok(RelayOutcome::Ignored { reason: "non-text message" });
            }
            WebhookPayload::Malformed => {
                warn!("Ignoring webhook without sender");
                return Ok(RelayOutcome::Ignored { reason: "malformed payload" });
            }
        };

        let claimed = match event.provider_message_id.as_deref() {
            Some(sid) => match self.store.claim_message(sid).await {
                Ok(MessageClaim::Claimed) => Some(sid),
                Ok(MessageClaim::Pending { reply }) => {
                    info!(message_sid = %sid, "Re-sending stored reply");
                    return self.deliver(&event, Some(sid), &reply, true).await;
                }
                Ok(MessageClaim::Handled) => {
                    info!(message_sid = %sid, "Duplicate webhook delivery");
                    return Ok(RelayOutcome::Duplicate {
                        message_sid: sid.to_string(),
                    });
                }
                Err(e) => {
                    warn!(message_sid = %sid, error = %e, "Failed to record message id, processing anyway");
                    None
                }
            },
            None => None,
        };

        info!(sender = %event.sender_address, "Relaying inbound message");

        let reply = match self.ask(&event).await {
            Ok(reply) => reply,
            Err(e) => {
                self.release(claimed).await;
                return Err(e);
            }
        };

        let sender = event.sender_identity();
        let display_name = event.display_name.as_deref();

        // History is best-effort; each append failure is logged and dropped.
        if let Err(e) = self.store.append_turn(sender, display_name, Role::User, &event.body_text).await {
            warn!(sender = %sender, error = %e, "Failed to store inbound turn");
        }
        if let Err(e) = self.store.append_turn(sender, display_name, Role::Assistant, &reply).await {
            warn!(sender = %sender, error = %e, "Failed to store reply turn");
        }

        let reply_stored = match claimed {
            Some(sid) => match self.store.store_reply(sid, &reply).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(message_sid = %sid, error = %e, "Failed to keep reply for retry");
                    false
                }
            },
            None => false,
        };

        self.deliver(&event, claimed, &reply, reply_stored).await
    }

    async fn ask(&self, event: &WebhookEvent) -> Result<String, RelayError> {
        let mut inbound = InboundMessage::new(&event.sender_address, &event.body_text, &self.config.topic);
        if let Some(name) = &event.display_name {
            inbound = inbound.with_display_name(name);
        }
        if let Some(sid) = &event.provider_message_id {
            inbound = inbound.with_message_id(sid);
        }

        match timeout(self.config.brain_timeout, self.brain.process(inbound)).await {
            Ok(Ok(reply)) => Ok(reply.text),
            Ok(Err(e)) => {
                error!(sender = %event.sender_address, brain = self.brain.name(), error = %e, "Brain failed");
                Err(e.into())
            }
            Err(_) => {
                error!(sender = %event.sender_address, "Brain timed out after {:?}", self.config.brain_timeout);
                Err(RelayError::Timeout(self.config.brain_timeout))
            }
        }
    }

    /// Send the reply. A failed send keeps the claim when the reply is
    /// stored for retry, and releases it otherwise.
    async fn deliver(
        &self,
        event: &WebhookEvent,
        claimed: Option<&str>,
        reply: &str,
        reply_stored: bool,
    ) -> Result<RelayOutcome, RelayError> {
        let message_sid = match self.replies.send_reply(&event.sender_address, reply).await {
            Ok(message_sid) => message_sid,
            Err(e) => {
                error!(sender = %event.sender_address, error = %e, "Failed to send reply");
                if !reply_stored {
                    self.release(claimed).await;
                }
                return Err(RelayError::Reply(e));
            }
        };

        if let Some(sid) = claimed {
            if let Err(e) = self.store.mark_sent(sid).await {
                warn!(message_sid = %sid, error = %e, "Failed to mark reply as sent");
            }
        }

        info!(sender = %event.sender_address, message_sid = %message_sid, "Reply sent");

        Ok(RelayOutcome::Replied {
            to: event.sender_address.clone(),
            message_sid,
        })
    }

    async fn release(&self, claimed: Option<&str>) {
        if let Some(sid) = claimed {
            if let Err(e) = self.store.release_message(sid).await {
                warn!(message_sid = %sid, error = %e, "Failed to release message id");
            }
        }
    }
}

impl std::fmt::Debug for MessageRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRelay")
            .field("brain", &self.brain.name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::WebhookForm;
    use async_trait::async_trait;
    use database::{conversation, Database, DatabaseError};
    use mock_brain::{CannedBrain, FailingBrain};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, String)>>,
        failures_left: AtomicUsize,
    }

    impl RecordingSender {
        fn failing() -> Self {
            Self::failing_times(usize::MAX)
        }

        fn failing_times(times: usize) -> Self {
            let sender = Self::default();
            sender.failures_left.store(times, Ordering::SeqCst);
            sender
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReplySender for RecordingSender {
        async fn send_reply(&self, address: &str, body: &str) -> Result<String, TwilioError> {
            let failing = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(TwilioError::Api {
                    status: 400,
                    code: 63016,
                    message: "outside the allowed window".to_string(),
                });
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((address.to_string(), body.to_string()));
            Ok(format!("SMreply{}", sent.len()))
        }
    }

    /// Store that fails every append but handles claims.
    struct BrokenHistory {
        inner: Database,
    }

    #[async_trait]
    impl ConversationStore for BrokenHistory {
        async fn append_turn(&self, _: &str, _: Option<&str>, _: Role, _: &str) -> Result<(), DatabaseError> {
            Err(DatabaseError::NotFound {
                entity: "conversation",
                id: "offline".to_string(),
            })
        }

        async fn claim_message(&self, sid: &str) -> Result<MessageClaim, DatabaseError> {
            self.inner.claim_message(sid).await
        }

        async fn store_reply(&self, sid: &str, reply: &str) -> Result<(), DatabaseError> {
            self.inner.store_reply(sid, reply).await
        }

        async fn mark_sent(&self, sid: &str) -> Result<(), DatabaseError> {
            self.inner.mark_sent(sid).await
        }

        async fn release_message(&self, sid: &str) -> Result<(), DatabaseError> {
            self.inner.release_message(sid).await
        }
    }

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn text(sid: &str, body: &str) -> WebhookPayload {
        WebhookPayload::parse(WebhookForm {
            from: Some("whatsapp:+13055550100".to_string()),
            body: Some(body.to_string()),
            message_sid: Some(sid.to_string()),
            profile_name: Some("Ana".to_string()),
            num_media: None,
        })
    }

    struct Harness {
        brain: Arc<CannedBrain>,
        db: Database,
        sender: Arc<RecordingSender>,
        relay: MessageRelay,
    }

    async fn harness(sender: RecordingSender) -> Harness {
        let brain = Arc::new(CannedBrain::new("Con gusto te ayudo."));
        let db = test_db().await;
        let sender = Arc::new(sender);
        let relay = MessageRelay::new(
            brain.clone(),
            Arc::new(db.clone()),
            sender.clone(),
            RelayConfig::default(),
        );
        Harness {
            brain,
            db,
            sender,
            relay,
        }
    }

    #[tokio::test]
    async fn test_text_message_is_answered_and_stored() {
        let h = harness(RecordingSender::default()).await;

        let outcome = h.relay.handle(text("SM1", "Necesito un seguro de auto")).await.unwrap();

        assert_eq!(
            outcome,
            RelayOutcome::Replied {
                to: "whatsapp:+13055550100".to_string(),
                message_sid: "SMreply1".to_string(),
            }
        );
        assert_eq!(
            h.sender.sent(),
            vec![("whatsapp:+13055550100".to_string(), "Con gusto te ayudo.".to_string())]
        );

        let seen = h.brain.seen();
        assert_eq!(seen[0].topic, DEFAULT_TOPIC);
        assert_eq!(seen[0].display_name.as_deref(), Some("Ana"));

        let conv = conversation::get_open_conversation(h.db.pool(), "+13055550100")
            .await
            .unwrap()
            .unwrap();
        let turns = conversation::get_turns(h.db.pool(), conv.id).await.unwrap();
        let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_second_message_extends_conversation() {
        let h = harness(RecordingSender::default()).await;

        h.relay.handle(text("SM1", "Hola")).await.unwrap();
        h.relay.handle(text("SM2", "¿Cuánto cuesta?")).await.unwrap();

        let all = conversation::list_conversations(h.db.pool(), "+13055550100").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(conversation::get_turns(h.db.pool(), all[0].id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_body_is_ignored_without_side_effects() {
        let h = harness(RecordingSender::default()).await;

        let outcome = h.relay.handle(text("SM1", "")).await.unwrap();

        assert!(matches!(outcome, RelayOutcome::Ignored { .. }));
        assert_eq!(h.brain.calls(), 0);
        assert!(h.sender.sent().is_empty());
        assert!(conversation::list_conversations(h.db.pool(), "+13055550100")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_redelivery_is_not_answered_twice() {
        let h = harness(RecordingSender::default()).await;

        h.relay.handle(text("SM1", "Hola")).await.unwrap();
        let outcome = h.relay.handle(text("SM1", "Hola")).await.unwrap();

        assert_eq!(
            outcome,
            RelayOutcome::Duplicate {
                message_sid: "SM1".to_string()
            }
        );
        assert_eq!(h.brain.calls(), 1);
        assert_eq!(h.sender.sent().len(), 1);
    }

    async fn turn_count(db: &Database) -> usize {
        let all = conversation::list_conversations(db.pool(), "+13055550100").await.unwrap();
        let mut count = 0;
        for conv in all {
            count += conversation::get_turns(db.pool(), conv.id).await.unwrap().len();
        }
        count
    }

    #[tokio::test]
    async fn test_failed_reply_is_resent_on_retry_without_new_turns() {
        let h = harness(RecordingSender::failing_times(1)).await;

        let err = h.relay.handle(text("SM1", "Hola")).await.unwrap_err();
        assert!(matches!(err, RelayError::Reply(_)));
        assert_eq!(turn_count(&h.db).await, 2);

        let retry = h.relay.handle(text("SM1", "Hola")).await.unwrap();
        assert!(matches!(retry, RelayOutcome::Replied { .. }));
        assert_eq!(h.brain.calls(), 1);
        assert_eq!(turn_count(&h.db).await, 2);
        assert_eq!(
            h.sender.sent(),
            vec![("whatsapp:+13055550100".to_string(), "Con gusto te ayudo.".to_string())]
        );

        let again = h.relay.handle(text("SM1", "Hola")).await.unwrap();
        assert!(matches!(again, RelayOutcome::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_repeated_send_failures_keep_single_exchange() {
        let h = harness(RecordingSender::failing()).await;

        for _ in 0..3 {
            let result = h.relay.handle(text("SM1", "Hola")).await;
            assert!(matches!(result, Err(RelayError::Reply(_))));
        }

        assert_eq!(h.brain.calls(), 1);
        assert_eq!(turn_count(&h.db).await, 2);
    }

    #[tokio::test]
    async fn test_brain_failure_sends_nothing() {
        let db = test_db().await;
        let brain = Arc::new(FailingBrain::new());
        let sender = Arc::new(RecordingSender::default());
        let relay = MessageRelay::new(brain.clone(), Arc::new(db.clone()), sender.clone(), RelayConfig::default());

        let err = relay.handle(text("SM1", "Hola")).await.unwrap_err();

        assert!(matches!(err, RelayError::Brain(_)));
        assert!(sender.sent().is_empty());
        assert!(processed_message_is_free(&db, "SM1").await);
    }

    #[tokio::test]
    async fn test_history_failure_does_not_block_reply() {
        let db = test_db().await;
        let sender = Arc::new(RecordingSender::default());
        let relay = MessageRelay::new(
            Arc::new(CannedBrain::new("ok")),
            Arc::new(BrokenHistory { inner: db }),
            sender.clone(),
            RelayConfig::default(),
        );

        let outcome = relay.handle(text("SM1", "Hola")).await.unwrap();

        assert!(matches!(outcome, RelayOutcome::Replied { .. }));
        assert_eq!(sender.sent().len(), 1);
    }

    #[test]
    fn test_outcome_serialization() {
        let value = serde_json_value(&RelayOutcome::Ignored { reason: "non-text message" });
        assert_eq!(value, r#"{"status":"ignored","reason":"non-text message"}"#);
    }

    async fn processed_message_is_free(db: &Database, sid: &str) -> bool {
        database::processed_message::claim_message(db.pool(), sid).await.unwrap() == MessageClaim::Claimed
    }

    fn serde_json_value(outcome: &RelayOutcome) -> String {
        serde_json::to_string(outcome).unwrap()
    }
}
