//! Supported locales.

use serde::{Deserialize, Serialize};

/// Language a message is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// Parse a language code, falling back to English for anything unknown.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "es" | "es-us" | "es-mx" | "es-es" | "spanish" | "español" => Locale::Es,
            _ => Locale::En,
        }
    }

    /// Two-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// Pick the string for this locale.
    pub fn pick(self, en: &'static str, es: &'static str) -> &'static str {
        match self {
            Locale::En => en,
            Locale::Es => es,
        }
    }
}
