use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A contact with this email already exists.
    #[error("contact already exists")]
    Conflict,

    /// The CRM answered with a non-success status.
    #[error("CRM API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Conflict reported but the existing contact could not be found.
    #[error("contact not found: {0}")]
    NotFound(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}
