//! Fixed-answer brains.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use brain_core::{Brain, BrainError, InboundMessage, OutboundMessage};

/// A brain that always answers with the same text.
///
/// Records every message it sees so tests can assert on call count and on
/// the topic the relay passed in.
#[derive(Debug, Default)]
pub struct CannedBrain {
    reply: String,
    calls: AtomicUsize,
    seen: Mutex<Vec<InboundMessage>>,
}

impl CannedBrain {
    /// Create a brain that answers every message with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Number of messages processed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages processed so far, oldest first.
    pub fn seen(&self) -> Vec<InboundMessage> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Brain for CannedBrain {
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(message.clone());
        }
        Ok(OutboundMessage::reply_to(&message, self.reply.clone()))
    }

    fn name(&self) -> &str {
        "CannedBrain"
    }
}

/// A brain that fails every call.
#[derive(Debug, Default)]
pub struct FailingBrain {
    calls: AtomicUsize,
}

impl FailingBrain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Brain for FailingBrain {
    async fn process(&self, _message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BrainError::ProcessingFailed("upstream returned 503".to_string()))
    }

    fn name(&self) -> &str {
        "FailingBrain"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_counts_calls() {
        let brain = CannedBrain::new("Gracias por escribirnos");
        let msg = InboundMessage::new("whatsapp:+13055550100", "hola", "insurance");

        let first = brain.process(msg.clone()).await.unwrap();
        brain.process(msg).await.unwrap();

        assert_eq!(first.text, "Gracias por escribirnos");
        assert_eq!(brain.calls(), 2);
        assert_eq!(brain.seen()[0].topic, "insurance");
    }

    #[tokio::test]
    async fn test_failing_brain() {
        let brain = FailingBrain::new();
        let msg = InboundMessage::new("whatsapp:+13055550100", "hola", "insurance");

        assert!(brain.process(msg).await.is_err());
        assert_eq!(brain.calls(), 1);
        assert!(!brain.is_ready().await);
    }
}
