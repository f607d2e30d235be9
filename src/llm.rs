//! Language model client for OpenAI-compatible chat completion endpoints.

use crate::config::{Credentials, LlmSettings};
use crate::error::{QuillError, Result};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Create a chat completions client for the configured endpoint.
pub fn create_client(settings: &LlmSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(|e| QuillError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(settings.api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Map a client error onto the crate's error taxonomy.
pub fn map_openai_error(err: OpenAIError) -> QuillError {
    match err {
        OpenAIError::Reqwest(e) => QuillError::Network(e.to_string()),
        OpenAIError::JSONDeserialize(e) => QuillError::Parse(e.to_string()),
        OpenAIError::InvalidArgument(msg) => QuillError::InvalidInput(msg),
        other => QuillError::Llm(other.to_string()),
    }
}

/// A hosted text-generation capability: one prompt in, one completion out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a single user prompt and return the text of the reply.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Identifier of the underlying model.
    fn model(&self) -> &str;
}

/// [`LanguageModel`] backed by a chat completions endpoint.
pub struct ChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl ChatModel {
    /// Build a model from settings and resolved credentials.
    pub fn new(settings: &LlmSettings, credentials: &Credentials) -> Result<Self> {
        Ok(Self {
            client: create_client(settings, &credentials.llm_api_key)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl LanguageModel for ChatModel {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| QuillError::Llm(e.to_string()))?
                .into(),
        ];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let request = builder.build().map_err(|e| QuillError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| QuillError::Llm("Empty response from model".to_string()))?;

        debug!("Model returned {} characters", content.len());
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_model_creation() {
        let settings = LlmSettings::default();
        let credentials = Credentials {
            llm_api_key: "test-key".to_string(),
            weather_api_key: None,
        };
        let model = ChatModel::new(&settings, &credentials).unwrap();
        assert_eq!(model.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_error_mapping() {
        let err = map_openai_error(OpenAIError::InvalidArgument("bad".to_string()));
        assert!(matches!(err, QuillError::InvalidInput(_)));

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = map_openai_error(OpenAIError::JSONDeserialize(json_err));
        assert!(matches!(err, QuillError::Parse(_)));

        let err = map_openai_error(OpenAIError::StreamError("closed".to_string()));
        assert!(matches!(err, QuillError::Llm(_)));
    }
}
