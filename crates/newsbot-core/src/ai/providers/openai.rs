use std::time::Duration;

use async_openai::{
    types::{ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use super::{AiProvider, SummaryOptions, AI_REQUEST_TIMEOUT_SECS};
use crate::{Error, Result};

/// OpenAI API provider
pub struct OpenAiProvider {
    client: Client<async_openai::config::OpenAIConfig>,
}

impl OpenAiProvider {
    pub fn new(api_key: &str) -> Result<Self> {
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(AI_REQUEST_TIMEOUT_SECS))
            .build()?;

        let client = Client::with_config(config)
            .with_http_client(http_client)
            .with_backoff(request_backoff());

        Ok(Self { client })
    }

    async fn chat(&self, prompt: &str, options: &SummaryOptions) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&options.model)
            .messages(vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()
                    .map_err(|e| Error::AiProvider(e.to_string()))?,
            )])
            .max_tokens(options.max_tokens)
            .temperature(1.0_f32)
            .top_p(1.0_f32)
            .build()
            .map_err(|e| Error::AiProvider(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| Error::AiProvider(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::AiProvider("OpenAI returned no choices".to_string()))
    }
}

/// Rate-limit retries stop after the request timeout so one article cannot stall the loop
fn request_backoff() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::from_secs(AI_REQUEST_TIMEOUT_SECS)))
        .build()
}

#[async_trait::async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn summarize(&self, text: &str, options: &SummaryOptions) -> Result<String> {
        let prompt = options.render_prompt(text);
        self.chat(&prompt, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_are_bounded() {
        let backoff = request_backoff();
        assert_eq!(
            backoff.max_elapsed_time,
            Some(Duration::from_secs(AI_REQUEST_TIMEOUT_SECS))
        );
    }

    #[test]
    fn test_new_builds_client() {
        let provider = OpenAiProvider::new("sk-test").unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
