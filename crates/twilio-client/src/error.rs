//! Error types for twilio-client.

use thiserror::Error;

/// Errors that can occur when talking to Twilio.
#[derive(Debug, Error)]
pub enum TwilioError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the Messages API.
    #[error("API error {status} (code {code}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    /// Recipient could not be normalized to a dialable number.
    #[error("Invalid phone number: {0}")]
    InvalidNumber(String),

    /// No sender is configured for the requested channel.
    #[error("No sender configured for {0}")]
    MissingSender(&'static str),

    /// Missing required environment variable.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}
