use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::SpeechError;

pub const DEFAULT_API_URL: &str = "https://api.elevenlabs.io";

/// Multilingual model, so Spanish and English share voices.
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub api_url: String,
    pub model_id: String,
    api_key: SecretString,
}

impl SpeechConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// Reads `ELEVENLABS_API_KEY` (required) and `ELEVENLABS_API_URL`.
    pub fn from_env() -> Result<Self, SpeechError> {
        let key = env::var("ELEVENLABS_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| SpeechError::MissingEnvVar("ELEVENLABS_API_KEY".to_string()))?;

        let mut config = Self::new(key);
        if let Ok(url) = env::var("ELEVENLABS_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}
