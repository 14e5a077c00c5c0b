//! Text-to-speech endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use ::speech::{SpeechError, VoiceProfile};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::routes::forms::{locale_of, required};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechRequest {
    pub text: Option<String>,
    pub voice_profile: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    pub success: bool,
    /// Base64-encoded MP3.
    pub audio: String,
    pub format: &'static str,
    pub voice_profile: &'static str,
    pub language: &'static str,
}

pub async fn synthesize(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Json<SpeechResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(Default::default(), e.body_text()))?;
    let locale = locale_of(request.language.as_deref());
    let text = required(locale, "text", request.text.as_deref())?;
    let voice = request
        .voice_profile
        .as_deref()
        .map(VoiceProfile::from_name)
        .unwrap_or_default();

    let synthesizer = state
        .speech
        .as_ref()
        .ok_or_else(|| ApiError::unconfigured(locale, "speech synthesis"))?;

    let audio = synthesizer.synthesize(&text, voice).await.map_err(|e| match e {
        invalid @ (SpeechError::EmptyText | SpeechError::TextTooLong { .. }) => {
            ApiError::bad_request(locale, invalid.to_string())
        }
        other => ApiError::provider(locale, other),
    })?;

    info!(bytes = audio.len(), voice = voice.as_str(), "Speech synthesized");

    Ok(Json(SpeechResponse {
        success: true,
        audio: STANDARD.encode(&audio),
        format: "mp3",
        voice_profile: voice.as_str(),
        language: locale.code(),
    }))
}
