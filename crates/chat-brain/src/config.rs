//! Configuration for ChatBrain.

use std::env;

use brain_core::BrainError;
use secrecy::SecretString;

/// System prompt used when `BOT_SYSTEM_PROMPT` is not set.
///
/// `{topic}` is replaced with the conversation topic of each message.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are the WhatsApp assistant of a bilingual \
insurance brokerage. Answer briefly and politely about {topic}. Reply in the language the \
customer writes in (English or Spanish). Never quote prices or bind coverage; offer to \
schedule a call with a licensed agent instead.";

/// Configuration for ChatBrain.
#[derive(Debug, Clone)]
pub struct ChatBrainConfig {
    /// Base URL of the chat-completions API.
    pub api_url: String,
    /// API key for authentication.
    pub api_key: SecretString,
    /// Model name to use.
    pub model: String,
    /// System prompt template (`{topic}` is substituted).
    pub system_prompt: String,
    /// Maximum tokens for response.
    pub max_tokens: Option<u32>,
    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,
}

impl Default for ChatBrainConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: SecretString::from(String::new()),
            model: "gpt-4o-mini".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: Some(400),
            temperature: Some(0.4),
        }
    }
}

impl ChatBrainConfig {
    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `BOT_API_KEY` - API key for authentication
    ///
    /// Optional:
    /// - `BOT_API_URL` - API URL (default: https://api.openai.com)
    /// - `BOT_MODEL` - Model name (default: gpt-4o-mini)
    /// - `BOT_SYSTEM_PROMPT` - System prompt template
    /// - `BOT_MAX_TOKENS` - Max tokens (default: 400)
    /// - `BOT_TEMPERATURE` - Temperature (default: 0.4)
    pub fn from_env() -> Result<Self, BrainError> {
        let defaults = Self::default();

        let api_key = env::var("BOT_API_KEY")
            .map_err(|_| BrainError::Configuration("BOT_API_KEY not set".to_string()))?;

        let api_url = env::var("BOT_API_URL").unwrap_or(defaults.api_url);
        let model = env::var("BOT_MODEL").unwrap_or(defaults.model);
        let system_prompt = env::var("BOT_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt);

        let max_tokens = env::var("BOT_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(defaults.max_tokens);

        let temperature = env::var("BOT_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(defaults.temperature);

        Ok(Self {
            api_url,
            api_key: SecretString::from(api_key),
            model,
            system_prompt,
            max_tokens,
            temperature,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> ChatBrainConfigBuilder {
        ChatBrainConfigBuilder::default()
    }

    /// Render the system prompt for a topic.
    pub fn system_prompt_for(&self, topic: &str) -> String {
        self.system_prompt.replace("{topic}", topic)
    }
}

/// Builder for ChatBrainConfig.
#[derive(Debug, Default)]
pub struct ChatBrainConfigBuilder {
    config: ChatBrainConfig,
}

impl ChatBrainConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = SecretString::from(key.into());
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    pub fn build(self) -> ChatBrainConfig {
        self.config
    }
}
