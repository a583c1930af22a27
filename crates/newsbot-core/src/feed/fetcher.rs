use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Proxy, StatusCode};
use url::Url;

use super::models::{NewArticle, Source};
use super::parser::{html_to_text, parse_feed};
use crate::config::AppConfig;
use crate::{Error, Result};

const MAX_FEED_BYTES: usize = 5 * 1024 * 1024;
const BOT_USER_AGENT: &str = concat!("newsbot/", env!("CARGO_PKG_VERSION"));

/// Network side of the fetch loop
#[async_trait]
pub trait FeedReader: Send + Sync {
    /// Retrieve the current article list of a source
    async fn fetch_articles(&self, source: &Source) -> Result<Vec<NewArticle>>;

    /// Download an article page and reduce it to plain text
    async fn fetch_page_text(&self, url: &str) -> Result<String>;
}

/// Feed fetcher backed by a shared HTTP client
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    /// Create a new feed fetcher with configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Self::build_client(config.sync.request_timeout_secs, &config.sync.proxy_url)?;

        Ok(Self { client })
    }

    /// Build HTTP client with optional proxy
    fn build_client(timeout_secs: u64, proxy_url: &Option<String>) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "application/rss+xml,application/atom+xml,application/xml;q=0.9,text/html;q=0.8,*/*;q=0.5"
            )
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(BOT_USER_AGENT));

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(headers)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        // Configure proxy if provided
        if let Some(ref proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for feed fetching");
        }

        builder.build().map_err(Error::Http)
    }

    /// GET a URL and return the body of a successful response
    async fn get(&self, url: &str) -> Result<Bytes> {
        Url::parse(url)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN
            && response.headers().get("cf-mitigated").is_some()
        {
            return Err(Error::FeedParse(format!(
                "Cloudflare protection detected for URL: {}",
                url
            )));
        }

        if !status.is_success() {
            return Err(Error::FeedParse(format!("HTTP {} for URL: {}", status, url)));
        }

        if let Some(length) = response.content_length() {
            ensure_content_size(length as usize, url)?;
        }

        let body = response.bytes().await?;
        ensure_content_size(body.len(), url)?;

        Ok(body)
    }
}

#[async_trait]
impl FeedReader for FeedFetcher {
    async fn fetch_articles(&self, source: &Source) -> Result<Vec<NewArticle>> {
        tracing::debug!(source = %source.name, url = %source.feed_url, "Fetching feed");

        let content = self.get(&source.feed_url).await?;
        parse_feed(&content, source.id)
    }

    async fn fetch_page_text(&self, url: &str) -> Result<String> {
        let content = self.get(url).await?;
        let html = String::from_utf8_lossy(&content);
        let text = html_to_text(&html);

        if text.is_empty() {
            return Err(Error::FeedParse(format!("No readable text at {}", url)));
        }

        Ok(text)
    }
}

fn ensure_content_size(size: usize, url: &str) -> Result<()> {
    if size > MAX_FEED_BYTES {
        return Err(Error::FeedParse(format!(
            "Response too large ({} bytes) for URL: {}",
            size,
            url
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_size_limit() {
        assert!(ensure_content_size(1024, "https://example.com/feed").is_ok());
        assert!(matches!(
            ensure_content_size(MAX_FEED_BYTES + 1, "https://example.com/feed"),
            Err(Error::FeedParse(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_malformed_url() {
        let fetcher = FeedFetcher::new(&AppConfig::default()).unwrap();
        let result = fetcher.fetch_page_text("not a url").await;
        assert!(matches!(result, Err(Error::UrlParse(_))));
    }
}
