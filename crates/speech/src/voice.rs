use serde::{Deserialize, Serialize};

/// Named voice presets exposed to clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceProfile {
    #[default]
    Professional,
    Friendly,
    Calm,
}

impl VoiceProfile {
    /// Parse a client-supplied name. Unknown names fall back to the default.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "friendly" => VoiceProfile::Friendly,
            "calm" => VoiceProfile::Calm,
            _ => VoiceProfile::Professional,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceProfile::Professional => "professional",
            VoiceProfile::Friendly => "friendly",
            VoiceProfile::Calm => "calm",
        }
    }

    pub fn voice_id(&self) -> &'static str {
        match self {
            VoiceProfile::Professional => "21m00Tcm4TlvDq8ikWAM",
            VoiceProfile::Friendly => "EXAVITQu4vr4xnSDxMaL",
            VoiceProfile::Calm => "pNInz6obpgDQGcFmaJgB",
        }
    }

    /// `(stability, similarity_boost)` sent with each request.
    pub(crate) fn settings(&self) -> (f32, f32) {
        match self {
            VoiceProfile::Professional => (0.6, 0.75),
            VoiceProfile::Friendly => (0.4, 0.8),
            VoiceProfile::Calm => (0.75, 0.7),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(VoiceProfile::from_name("Friendly"), VoiceProfile::Friendly);
        assert_eq!(VoiceProfile::from_name(" calm "), VoiceProfile::Calm);
        assert_eq!(VoiceProfile::from_name("robot"), VoiceProfile::Professional);
        assert_eq!(VoiceProfile::from_name(""), VoiceProfile::Professional);
    }
}
