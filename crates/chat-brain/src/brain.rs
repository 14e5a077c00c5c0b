//! ChatBrain implementation.

use brain_core::{async_trait, Brain, BrainError, InboundMessage, OutboundMessage};
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::ChatBrainConfig;

/// A brain backed by a chat-completions API.
///
/// Stateless: the relay persists the conversation, so each call sends only
/// the system prompt and the current message.
pub struct ChatBrain {
    client: Client,
    config: ChatBrainConfig,
}

impl ChatBrain {
    /// Create a new ChatBrain with the given configuration.
    pub fn new(config: ChatBrainConfig) -> Result<Self, BrainError> {
        let client = Client::builder()
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        info!("ChatBrain initialized with model: {}", config.model);

        Ok(Self { client, config })
    }

    /// Create a ChatBrain from environment variables.
    ///
    /// See [`ChatBrainConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, BrainError> {
        Self::new(ChatBrainConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChatBrainConfig {
        &self.config
    }

    fn build_request(&self, message: &InboundMessage) -> ChatCompletionRequest {
        let mut user_text = message.text.clone();
        if let Some(name) = message.display_name.as_deref() {
            user_text = format!("[{}] {}", name, user_text);
        }

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(self.config.system_prompt_for(&message.topic)),
                ChatMessage::user(user_text),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            user: Some(message.sender.clone()),
        }
    }

    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BrainError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| BrainError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(BrainError::ProcessingFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(BrainError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Brain for ChatBrain {
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        debug!("Processing message from {}", message.sender);

        let completion = self.chat_completion(self.build_request(&message)).await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(BrainError::EmptyReply)?;

        Ok(OutboundMessage::reply_to(&message, text))
    }

    fn name(&self) -> &str {
        "ChatBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brain() -> ChatBrain {
        let config = ChatBrainConfig::builder()
            .api_key("test-key")
            .model("gpt-test")
            .system_prompt("Topic: {topic}")
            .build();
        ChatBrain::new(config).unwrap()
    }

    #[test]
    fn test_build_request_frames_topic_and_sender() {
        let message = InboundMessage::new("whatsapp:+13055550100", "need auto quote", "auto insurance")
            .with_display_name("Ana");

        let request = brain().build_request(&message);

        assert_eq!(request.model, "gpt-test");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, "Topic: auto insurance");
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.messages[1].content, "[Ana] need auto quote");
        assert_eq!(request.user.as_deref(), Some("whatsapp:+13055550100"));
    }

    #[test]
    fn test_brain_name() {
        assert_eq!(brain().name(), "ChatBrain");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_network_error() {
        let config = ChatBrainConfig::builder()
            .api_key("test-key")
            .api_url("http://127.0.0.1:9")
            .build();
        let brain = ChatBrain::new(config).unwrap();
        let message = InboundMessage::new("whatsapp:+13055550100", "hola", "insurance");

        let result = brain.process(message).await;
        assert!(matches!(result, Err(BrainError::Network(_))));
    }
}
