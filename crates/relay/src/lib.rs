//! Inbound message relay.
//!
//! One provider webhook delivery becomes one brain call, two stored turns,
//! and one outbound reply on the channel the message arrived on.
//!
//! ```text
//! WebhookForm --parse--> WebhookPayload --Text--> Brain --> store(user, assistant) --> ReplySender
//!                                       \--NonText/Malformed--> Ignored
//! ```

mod payload;
mod relay;
mod store;

pub use payload::{WebhookEvent, WebhookForm, WebhookPayload};
pub use relay::{MessageRelay, RelayConfig, RelayError, RelayOutcome, DEFAULT_TOPIC};
pub use store::{ConversationStore, ReplySender};
