mod claude_api;
mod openai;

pub use claude_api::ClaudeApiProvider;
pub use openai::OpenAiProvider;

use crate::Result;

/// Per-request timeout, also the cap on time spent retrying rate-limited calls
pub(crate) const AI_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Per-call summarization settings
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Provider-specific model identifier
    pub model: String,
    /// Prompt template; `{text}` marks where the article text goes
    pub prompt: String,
    pub max_tokens: u32,
    /// Article text is cut to this many characters
    pub max_input_chars: usize,
}

impl SummaryOptions {
    /// Fill the prompt template with (truncated) article text.
    /// Templates without a placeholder get the text appended.
    pub fn render_prompt(&self, text: &str) -> String {
        let text = truncate_chars(text.trim(), self.max_input_chars);

        if self.prompt.contains("{text}") {
            self.prompt.replace("{text}", text)
        } else {
            format!("{}\n\n{}", self.prompt.trim_end(), text)
        }
    }
}

pub(crate) fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

/// Trait for AI summarization providers
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Condense `text` according to `options`
    async fn summarize(&self, text: &str, options: &SummaryOptions) -> Result<String>;
}
