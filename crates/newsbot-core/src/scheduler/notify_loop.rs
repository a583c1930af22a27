use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{PeriodicTask, Shutdown};
use crate::ai::Summarizer;
use crate::config::AppConfig;
use crate::feed::{Article, FeedReader};
use crate::publish::{markup, Publisher};
use crate::storage::{ArticleStore, CandidateWindow};
use crate::{Error, Result};

/// What a single notification tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// No unposted article inside the lookback window
    Idle,
    Posted(Uuid),
    /// Summarizer failed; the article stays unposted
    SummarizeFailed(Uuid),
    /// Publisher failed; the article stays unposted
    PublishFailed(Uuid),
    /// Published, but the posted mark could not be stored.
    /// The article may be published again on a later tick.
    MarkFailed(Uuid),
}

/// Periodically summarizes and publishes one unposted article
pub struct NotificationLoop {
    articles: Arc<dyn ArticleStore>,
    publisher: Arc<dyn Publisher>,
    summarizer: Option<Arc<Summarizer>>,
    page_reader: Option<Arc<dyn FeedReader>>,
    channel_id: String,
    task: PeriodicTask,
    lookback: Duration,
    excerpt_length: usize,
    // Held from selection to mark-posted so two ticks never pick the same article
    publish_guard: Mutex<()>,
}

impl NotificationLoop {
    /// Fails with a config error when `interval` or `lookback` is zero
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        publisher: Arc<dyn Publisher>,
        channel_id: impl Into<String>,
        interval: Duration,
        lookback: Duration,
    ) -> Result<Self> {
        if lookback.is_zero() {
            return Err(Error::Config("lookback window must be greater than zero".to_string()));
        }

        Ok(Self {
            articles,
            publisher,
            summarizer: None,
            page_reader: None,
            channel_id: channel_id.into(),
            task: PeriodicTask::new("notification", interval)?,
            lookback,
            excerpt_length: 300,
            publish_guard: Mutex::new(()),
        })
    }

    /// Wire the loop from configuration. The summarizer is omitted when AI is disabled.
    pub fn from_config(
        config: &AppConfig,
        articles: Arc<dyn ArticleStore>,
        publisher: Arc<dyn Publisher>,
        page_reader: Arc<dyn FeedReader>,
    ) -> Result<Self> {
        config.validate_publishing()?;

        let channel_id = config
            .telegram
            .channel_id
            .clone()
            .ok_or_else(|| Error::Config("telegram.channel_id is not configured".to_string()))?;

        let mut notifier = Self::new(
            articles,
            publisher,
            channel_id,
            config.notification_interval(),
            config.lookback_window(),
        )?
        .with_page_reader(page_reader)
        .with_excerpt_length(config.ai.max_summary_length);

        if config.ai.enabled {
            notifier = notifier.with_summarizer(Arc::new(Summarizer::new(config)?));
        }

        Ok(notifier)
    }

    pub fn with_summarizer(mut self, summarizer: Arc<Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Used to fetch the article page when the feed carried no text
    pub fn with_page_reader(mut self, reader: Arc<dyn FeedReader>) -> Self {
        self.page_reader = Some(reader);
        self
    }

    /// Excerpt length used when posting without a summarizer
    pub fn with_excerpt_length(mut self, length: usize) -> Self {
        self.excerpt_length = length;
        self
    }

    pub fn lookback(&self) -> Duration {
        self.lookback
    }

    /// Notify on every interval until shutdown. Returns `Err(Error::Cancelled)` once stopped.
    pub async fn start(&self, shutdown: Shutdown) -> Result<()> {
        self.task
            .run(shutdown, move || async move { self.send_next().await.map(|_| ()) })
            .await
    }

    /// Pick the most recent unposted article in the lookback window, summarize it,
    /// publish it and mark it posted. Only store read errors are returned as `Err`;
    /// per-article failures are reported through [`NotifyOutcome`].
    pub async fn send_next(&self) -> Result<NotifyOutcome> {
        let _guard = self.publish_guard.lock().await;

        let window = CandidateWindow::ending_at(Utc::now(), self.lookback);
        let Some(article) = self.articles.find_candidate(&window).await? else {
            debug!(from = %window.from, to = %window.to, "No unposted article in window");
            return Ok(NotifyOutcome::Idle);
        };

        let summary = match self.condense(&article).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(article_id = %article.id, title = %article.title, error = %e, "Failed to summarize article");
                return Ok(NotifyOutcome::SummarizeFailed(article.id));
            }
        };

        let message = markup::compose_post(&article, &summary);
        if let Err(e) = self.publisher.publish(&self.channel_id, &message).await {
            warn!(article_id = %article.id, title = %article.title, error = %e, "Failed to publish article");
            return Ok(NotifyOutcome::PublishFailed(article.id));
        }

        if let Err(e) = self.articles.mark_posted(article.id).await {
            warn!(
                article_id = %article.id,
                error = %e,
                "Article was published but could not be marked as posted; it may be published again"
            );
            return Ok(NotifyOutcome::MarkFailed(article.id));
        }

        info!(article_id = %article.id, title = %article.title, "Published article");
        Ok(NotifyOutcome::Posted(article.id))
    }

    async fn condense(&self, article: &Article) -> Result<String> {
        match &self.summarizer {
            Some(summarizer) => {
                let text = self.source_text(article).await;
                summarizer.summarize(&text).await
            }
            None => Ok(article.summary_preview(self.excerpt_length)),
        }
    }

    /// Feed text first, then the linked page, then the bare title
    async fn source_text(&self, article: &Article) -> String {
        if let Some(summary) = article.summary.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return summary.to_string();
        }

        if let Some(reader) = &self.page_reader {
            match reader.fetch_page_text(&article.link).await {
                Ok(text) if !text.trim().is_empty() => return text,
                Ok(_) => debug!(link = %article.link, "Article page has no text"),
                Err(e) => debug!(link = %article.link, error = %e, "Failed to fetch article page"),
            }
        }

        article.title.clone()
    }
}
