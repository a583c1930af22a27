use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{AiProvider, SummaryOptions, AI_REQUEST_TIMEOUT_SECS};
use crate::{Error, Result};

const CLAUDE_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Serialize)]
struct ClaudeMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Option<Vec<ClaudeContent>>,
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: String,
}

/// Claude/Anthropic API provider
pub struct ClaudeApiProvider {
    client: Client,
    api_key: String,
}

impl ClaudeApiProvider {
    pub fn new(api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(AI_REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
        })
    }

    async fn chat(&self, prompt: &str, options: &SummaryOptions) -> Result<String> {
        let request = ClaudeRequest {
            model: &options.model,
            max_tokens: options.max_tokens,
            messages: vec![ClaudeMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(CLAUDE_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::AiProvider(format!("Claude API request failed: {}", e)))?;

        let claude_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| Error::AiProvider(format!("Failed to parse Claude response: {}", e)))?;

        parse_response(claude_response)
    }
}

fn parse_response(response: ClaudeResponse) -> Result<String> {
    if let Some(error) = response.error {
        return Err(Error::AiProvider(format!("Claude API error: {}", error.message)));
    }

    response
        .content
        .unwrap_or_default()
        .into_iter()
        .find_map(|c| c.text)
        .ok_or_else(|| Error::AiProvider("Claude API returned no text".to_string()))
}

#[async_trait::async_trait]
impl AiProvider for ClaudeApiProvider {
    fn name(&self) -> &str {
        "claude_api"
    }

    async fn summarize(&self, text: &str, options: &SummaryOptions) -> Result<String> {
        let prompt = options.render_prompt(text);
        self.chat(&prompt, options).await
    }
}
