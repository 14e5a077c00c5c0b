//! Brain error types.

use thiserror::Error;

/// Errors a brain can return.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The brain is missing configuration (API key, URL, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The upstream API could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The upstream API answered but the reply could not be produced.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The brain produced no usable text.
    #[error("brain returned an empty reply")]
    EmptyReply,
}
