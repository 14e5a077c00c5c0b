use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("speech API error (HTTP {status})")]
    Api { status: u16 },

    #[error("text is empty")]
    EmptyText,

    #[error("text exceeds {max} characters")]
    TextTooLong { max: usize },

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}
