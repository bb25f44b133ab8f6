//! OpenAI chat completions implementation.

use super::LanguageModel;
use crate::config::Settings;
use crate::error::{DocentError, Result};
use crate::openai::{api_error, create_client, OpenAIClient};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat model reached through the OpenAI API (or a compatible endpoint).
pub struct OpenAIChatModel {
    client: OpenAIClient,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    /// Create a chat model from the `[llm]` settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = create_client(
            settings.llm.api_base.as_deref(),
            Duration::from_secs(settings.llm.timeout_secs),
        )?;
        Ok(Self::with_client(client, &settings.llm.model, settings.llm.temperature))
    }

    pub fn with_client(client: OpenAIClient, model: &str, temperature: f32) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature,
        }
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

#[async_trait]
impl LanguageModel for OpenAIChatModel {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| DocentError::AnalysisFailed(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| DocentError::AnalysisFailed(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| api_error("Failed to get completion", e))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DocentError::AnalysisFailed("Empty response from LLM".to_string()))?;

        debug!("Completion: {}", content.chars().take(200).collect::<String>());
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_from_settings() {
        let mut settings = Settings::default();
        settings.llm.model = "gemini-2.5-flash".to_string();
        settings.llm.api_base =
            Some("https://generativelanguage.googleapis.com/v1beta/openai".to_string());

        let model = OpenAIChatModel::from_settings(&settings).unwrap();
        assert_eq!(model.model_name(), "gemini-2.5-flash");
        assert!((model.temperature() - 0.3).abs() < f32::EPSILON);
    }
}
