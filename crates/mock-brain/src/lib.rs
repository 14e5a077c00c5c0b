//! Mock brain implementations for relay tests.
//!
//! - `CannedBrain` - Always answers with the same text and counts calls
//! - `FailingBrain` - Always fails
//!
//! For production replies, use the `chat-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, CannedBrain, InboundMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = CannedBrain::new("Con gusto te ayudo.");
//!
//!     let message = InboundMessage::new("whatsapp:+13055550100", "Hello!", "insurance");
//!
//!     let response = brain.process(message).await?;
//!     println!("Response: {}", response.text);
//!     Ok(())
//! }
//! ```

mod canned;

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, InboundMessage, OutboundMessage};

pub use canned::{CannedBrain, FailingBrain};
