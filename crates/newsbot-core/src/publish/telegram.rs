use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Publisher;
use crate::config::TelegramConfig;
use crate::{Error, Result};

const PUBLISH_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

/// Publishes through the Telegram Bot API `sendMessage` method
pub struct TelegramPublisher {
    client: Client,
    endpoint: String,
}

impl TelegramPublisher {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let token = config
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Config("telegram.bot_token is not configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(PUBLISH_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: send_message_url(&config.api_base_url, token),
        })
    }
}

fn send_message_url(base_url: &str, token: &str) -> String {
    format!("{}/bot{}/sendMessage", base_url.trim_end_matches('/'), token)
}

#[async_trait]
impl Publisher for TelegramPublisher {
    async fn publish(&self, channel_id: &str, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: channel_id,
            text,
            parse_mode: "MarkdownV2",
        };

        // The endpoint embeds the bot token, so it never goes into errors or logs
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Publish(format!("sendMessage request failed: {}", e.without_url())))?;

        let status = response.status();
        let body: TelegramResponse = response
            .json()
            .await
            .map_err(|e| Error::Publish(format!("Invalid sendMessage response ({}): {}", status, e.without_url())))?;

        check_response(body)
    }
}

fn check_response(body: TelegramResponse) -> Result<()> {
    if body.ok {
        Ok(())
    } else {
        Err(Error::Publish(
            body.description
                .unwrap_or_else(|| "Telegram rejected the message".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url() {
        assert_eq!(
            send_message_url("https://api.telegram.org/", "123:abc"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_requires_token() {
        let config = TelegramConfig::default();
        assert!(matches!(TelegramPublisher::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_check_response() {
        let ok: TelegramResponse = serde_json::from_str(r#"{"ok":true,"result":{}}"#).unwrap();
        assert!(check_response(ok).is_ok());

        let rejected: TelegramResponse = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities"}"#,
        )
        .unwrap();
        let err = check_response(rejected).unwrap_err();
        assert!(err.to_string().contains("can't parse entities"));
    }

    #[test]
    fn test_request_uses_markdown_v2() {
        let request = SendMessageRequest {
            chat_id: "@news",
            text: "*hi*",
            parse_mode: "MarkdownV2",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chat_id"], "@news");
        assert_eq!(json["parse_mode"], "MarkdownV2");
    }
}
