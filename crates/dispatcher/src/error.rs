//! Dispatcher error types.

use thiserror::Error;

/// Errors that stop a dispatch before any message is sent.
///
/// Per-recipient delivery failures are not errors; they are reported in
/// [`crate::DispatchReport`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No transport is configured for the requested channel.
    #[error("no {0} channel configured")]
    ChannelUnavailable(&'static str),

    /// The request has no recipients.
    #[error("notification has no recipients")]
    NoRecipients,

    /// The template failed to render.
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}
