//! ElevenLabs text-to-speech client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SpeechConfig;
use crate::voice::VoiceProfile;
use crate::{SpeechError, SpeechSynthesizer, MAX_TEXT_LENGTH};

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Clone)]
pub struct ElevenLabsClient {
    http: Client,
    config: SpeechConfig,
}

impl ElevenLabsClient {
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, SpeechError> {
        Self::new(SpeechConfig::from_env()?)
    }

    fn synthesis_url(&self, voice: VoiceProfile) -> String {
        format!("{}/v1/text-to-speech/{}", self.config.api_url, voice.voice_id())
    }

    fn build_request<'a>(&'a self, text: &'a str, voice: VoiceProfile) -> SynthesisRequest<'a> {
        let (stability, similarity_boost) = voice.settings();
        SynthesisRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability,
                similarity_boost,
            },
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str, voice: VoiceProfile) -> Result<Vec<u8>, SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }
        if text.chars().count() > MAX_TEXT_LENGTH {
            return Err(SpeechError::TextTooLong { max: MAX_TEXT_LENGTH });
        }

        let response = self
            .http
            .post(self.synthesis_url(voice))
            .header("xi-api-key", self.config.api_key())
            .header("accept", "audio/mpeg")
            .json(&self.build_request(text, voice))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), voice = voice.as_str(), "Speech synthesis failed");
            return Err(SpeechError::Api {
                status: status.as_u16(),
            });
        }

        let audio = response.bytes().await?.to_vec();
        debug!(bytes = audio.len(), voice = voice.as_str(), "Synthesized speech");
        Ok(audio)
    }
}

impl std::fmt::Debug for ElevenLabsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsClient")
            .field("api_url", &self.config.api_url)
            .field("model_id", &self.config.model_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ElevenLabsClient {
        ElevenLabsClient::new(SpeechConfig::new("xi-secret").with_api_url("http://127.0.0.1:9/")).unwrap()
    }

    #[test]
    fn test_synthesis_url() {
        assert_eq!(
            client().synthesis_url(VoiceProfile::Calm),
            "http://127.0.0.1:9/v1/text-to-speech/pNInz6obpgDQGcFmaJgB"
        );
    }

    #[test]
    fn test_request_body() {
        let client = client();
        let body = serde_json::to_value(client.build_request("Hola", VoiceProfile::Friendly)).unwrap();
        assert_eq!(body["text"], "Hola");
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert!(body["voice_settings"]["stability"].is_number());
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized_text() {
        let client = client();
        assert!(matches!(
            client.synthesize("  ", VoiceProfile::Professional).await,
            Err(SpeechError::EmptyText)
        ));

        let long = "a".repeat(MAX_TEXT_LENGTH + 1);
        assert!(matches!(
            client.synthesize(&long, VoiceProfile::Professional).await,
            Err(SpeechError::TextTooLong { .. })
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        assert!(!format!("{:?}", client()).contains("xi-secret"));
    }
}
