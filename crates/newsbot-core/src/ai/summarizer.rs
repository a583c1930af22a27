use std::sync::Arc;

use super::providers::{AiProvider, ClaudeApiProvider, OpenAiProvider, SummaryOptions};
use crate::config::AppConfig;
use crate::{Error, Result};

/// AI Summarizer that wraps the configured provider
pub struct Summarizer {
    provider: Arc<dyn AiProvider>,
    options: SummaryOptions,
}

impl Summarizer {
    /// Create a new summarizer based on configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let ai = &config.ai;

        let (provider, model): (Arc<dyn AiProvider>, &str) = match ai.provider.as_str() {
            "openai" => {
                let api_key = ai.openai_api_key.as_ref()
                    .ok_or_else(|| Error::Config("OpenAI API key not configured".to_string()))?;
                (Arc::new(OpenAiProvider::new(api_key)?), &ai.openai_model)
            }
            "claude_api" => {
                let api_key = ai.claude_api_key.as_ref()
                    .ok_or_else(|| Error::Config("Claude API key not configured".to_string()))?;
                (Arc::new(ClaudeApiProvider::new(api_key)?), &ai.claude_model)
            }
            other => {
                return Err(Error::Config(format!("Unknown AI provider: {}", other)));
            }
        };

        let options = SummaryOptions {
            model: model.to_string(),
            prompt: ai.prompt.clone(),
            max_tokens: ai.max_summary_tokens.max(1),
            max_input_chars: ai.max_input_chars.max(1),
        };

        Ok(Self::with_provider(provider, options))
    }

    pub fn with_provider(provider: Arc<dyn AiProvider>, options: SummaryOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Condense article text. The result always ends on a complete sentence
    /// when the model output contains one.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::AiProvider("Nothing to summarize".to_string()));
        }

        let raw = self.provider.summarize(text, &self.options).await?;
        let summary = finish_at_sentence(&raw);

        if summary.is_empty() {
            return Err(Error::AiProvider(format!(
                "{} returned an empty summary",
                self.provider.name()
            )));
        }

        Ok(summary)
    }
}

/// Drop a trailing unfinished sentence, which models produce when they hit
/// the token limit.
fn finish_at_sentence(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.is_empty() || trimmed.ends_with(['.', '!', '?', '…']) {
        return trimmed.to_string();
    }

    match trimmed.rfind(['.', '!', '?', '…']) {
        Some(idx) => {
            let end = idx + trimmed[idx..].chars().next().map_or(1, char::len_utf8);
            trimmed[..end].to_string()
        }
        None => trimmed.to_string(),
    }
}
