//! The `Brain` trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BrainError;
use crate::message::{InboundMessage, OutboundMessage};

/// Something that can answer a customer message.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Produce a reply for `message`.
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError>;

    /// Human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Whether the brain is ready to take messages.
    async fn is_ready(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: Brain + ?Sized> Brain for Arc<T> {
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        (**self).process(message).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn is_ready(&self) -> bool {
        (**self).is_ready().await
    }
}
