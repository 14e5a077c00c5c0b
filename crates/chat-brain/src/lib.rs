//! Chat-completions brain for the WhatsApp relay.
//!
//! Sends each customer message, framed by a brokerage system prompt and the
//! conversation topic, to an OpenAI-compatible `/v1/chat/completions`
//! endpoint and returns the first choice as the reply.
//!
//! ```rust,no_run
//! use chat_brain::ChatBrain;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let brain = ChatBrain::from_env()?;
//! // Use the brain...
//! # Ok(())
//! # }
//! ```

mod api_types;
mod brain;
mod config;

pub use brain::ChatBrain;
pub use config::{ChatBrainConfig, ChatBrainConfigBuilder, DEFAULT_SYSTEM_PROMPT};
