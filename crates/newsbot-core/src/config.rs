use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between two fetch ticks
    #[serde(default = "default_fetch_interval")]
    pub fetch_interval_secs: u64,
    /// Seconds between two notification ticks
    #[serde(default = "default_notification_interval")]
    pub notification_interval_secs: u64,
    /// Lookback window, in multiples of the fetch interval
    #[serde(default = "default_lookback_multiplier")]
    pub lookback_multiplier: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// HTTP proxy URL for feed fetching (e.g., "http://127.0.0.1:7890" or "socks5://127.0.0.1:1080")
    #[serde(default)]
    pub proxy_url: Option<String>,
    /// Keywords applied to sources that carry no keyword list of their own
    #[serde(default)]
    pub filter_keywords: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_interval_secs: default_fetch_interval(),
            notification_interval_secs: default_notification_interval(),
            lookback_multiplier: default_lookback_multiplier(),
            request_timeout_secs: default_timeout(),
            proxy_url: None,
            filter_keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Enable AI summarization
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// AI provider: "openai" or "claude_api"
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    /// OpenAI API key (for openai provider)
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// OpenAI model name
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Claude/Anthropic API key (for claude_api provider)
    #[serde(default)]
    pub claude_api_key: Option<String>,
    /// Claude model name
    #[serde(default = "default_claude_model")]
    pub claude_model: String,
    /// Prompt template; `{text}` is replaced by the article text
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Max tokens for summary
    #[serde(default = "default_max_tokens")]
    pub max_summary_tokens: u32,
    /// Article text is cut to this many chars before it is sent to the provider
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Maximum length (chars) of the raw excerpt posted when AI is disabled
    #[serde(default = "default_max_summary_length")]
    pub max_summary_length: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            provider: default_ai_provider(),
            openai_api_key: None,
            openai_model: default_openai_model(),
            claude_api_key: None,
            claude_model: default_claude_model(),
            prompt: default_prompt(),
            max_summary_tokens: default_max_tokens(),
            max_input_chars: default_max_input_chars(),
            max_summary_length: default_max_summary_length(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Target channel: numeric id ("-100...") or "@channelname"
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Bot API endpoint
    #[serde(default = "default_telegram_api")]
    pub api_base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            channel_id: None,
            api_base_url: default_telegram_api(),
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("channel_id", &self.channel_id)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("newsbot")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_fetch_interval() -> u64 {
    600 // 10 minutes
}

fn default_notification_interval() -> u64 {
    60 // 1 minute
}

fn default_lookback_multiplier() -> u32 {
    2
}

fn default_timeout() -> u64 {
    30
}

fn default_ai_provider() -> String {
    "openai".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_claude_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_prompt() -> String {
    "Summarize the following article in 2-3 sentences. \
Be concise and focus on the key points:\n\n{text}"
        .to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_input_chars() -> usize {
    4000
}

fn default_max_summary_length() -> usize {
    300
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default path, or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`; a missing file yields defaults.
    /// Environment overrides are applied in both cases.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Secrets may come from the environment instead of the config file
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("NEWSBOT_TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(channel) = lookup("NEWSBOT_TELEGRAM_CHANNEL_ID") {
            self.telegram.channel_id = Some(channel);
        }
        if let Some(key) = lookup("NEWSBOT_OPENAI_API_KEY") {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(key) = lookup("NEWSBOT_CLAUDE_API_KEY") {
            self.ai.claude_api_key = Some(key);
        }
    }

    /// Check the scheduling values the loops depend on
    pub fn validate(&self) -> crate::Result<()> {
        if self.sync.fetch_interval_secs == 0 {
            return Err(crate::Error::Config(
                "sync.fetch_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.sync.notification_interval_secs == 0 {
            return Err(crate::Error::Config(
                "sync.notification_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.sync.lookback_multiplier == 0 {
            return Err(crate::Error::Config(
                "sync.lookback_multiplier must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Check that a publishing target is configured
    pub fn validate_publishing(&self) -> crate::Result<()> {
        self.validate()?;
        if self.telegram.bot_token.as_deref().map_or(true, str::is_empty) {
            return Err(crate::Error::Config(
                "telegram.bot_token is not configured".to_string(),
            ));
        }
        if self.telegram.channel_id.as_deref().map_or(true, str::is_empty) {
            return Err(crate::Error::Config(
                "telegram.channel_id is not configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/newsbot/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("newsbot")
            .join("config.toml")
    }

    /// Get the database file path
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("newsbot.db")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.sync.fetch_interval_secs)
    }

    pub fn notification_interval(&self) -> Duration {
        Duration::from_secs(self.sync.notification_interval_secs)
    }

    /// How long after publication an article stays eligible for posting
    pub fn lookback_window(&self) -> Duration {
        self.fetch_interval() * self.sync.lookback_multiplier
    }
}
