//! Core trait and types for brain implementations.
//!
//! A brain turns one customer message into one reply. The relay treats it as
//! a black box: it hands over the text, the conversation topic, and the
//! sender, and waits for the reply before answering the webhook.
//!
//! - [`Brain`] - The trait every brain implements
//! - [`InboundMessage`] / [`OutboundMessage`] - Input and output
//! - [`BrainError`] - Error type for brain operations
//!
//! # Example
//!
//! ```rust
//! use brain_core::{Brain, BrainError, InboundMessage, OutboundMessage};
//! use async_trait::async_trait;
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl Brain for Greeter {
//!     async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
//!         Ok(OutboundMessage::reply_to(&message, "Hola!"))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Greeter"
//!     }
//! }
//! ```

mod error;
mod message;
mod trait_def;

pub use error::BrainError;
pub use message::{InboundMessage, OutboundMessage};
pub use trait_def::Brain;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
