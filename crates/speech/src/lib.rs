//! Text-to-speech for the brokerage assistant.
//!
//! [`ElevenLabsClient`] turns text into MP3 audio using one of a small set of
//! [`VoiceProfile`]s. Callers depend on [`SpeechSynthesizer`].

mod client;
mod config;
mod error;
mod voice;

pub use client::ElevenLabsClient;
pub use config::{SpeechConfig, DEFAULT_API_URL, DEFAULT_MODEL_ID};
pub use error::SpeechError;
pub use voice::VoiceProfile;

use async_trait::async_trait;

/// Maximum characters accepted in one synthesis request.
pub const MAX_TEXT_LENGTH: usize = 5000;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return MP3 bytes.
    async fn synthesize(&self, text: &str, voice: VoiceProfile) -> Result<Vec<u8>, SpeechError>;
}
