use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{PeriodicTask, Shutdown};
use crate::config::AppConfig;
use crate::feed::{FeedFetcher, FeedReader, KeywordFilter, Source};
use crate::storage::{ArticleRepository, ArticleStore, Database, SourceRegistry, SourceRepository};
use crate::Result;

/// Outcome of one pass over every source
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub sources: u32,
    pub inserted: u32,
    /// Entries whose `(source, link)` was already stored
    pub known: u32,
    /// Entries dropped by the keyword filter
    pub filtered: u32,
    pub failures: Vec<SourceFailure>,
}

#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

impl FetchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Periodically pulls every source's feed into the article store
pub struct FetchLoop {
    sources: Arc<dyn SourceRegistry>,
    articles: Arc<dyn ArticleStore>,
    reader: Arc<dyn FeedReader>,
    task: PeriodicTask,
    filter_keywords: Vec<String>,
}

impl FetchLoop {
    /// Fails with a config error when `interval` is zero
    pub fn new(
        sources: Arc<dyn SourceRegistry>,
        articles: Arc<dyn ArticleStore>,
        reader: Arc<dyn FeedReader>,
        interval: Duration,
    ) -> Result<Self> {
        Ok(Self {
            sources,
            articles,
            reader,
            task: PeriodicTask::new("fetch", interval)?,
            filter_keywords: Vec::new(),
        })
    }

    /// Wire the loop to the SQLite repositories and the HTTP fetcher
    pub fn from_config(db: &Database, config: &AppConfig) -> Result<Self> {
        let fetcher = FeedFetcher::new(config)?;

        Ok(Self::new(
            Arc::new(SourceRepository::new(db)),
            Arc::new(ArticleRepository::new(db)),
            Arc::new(fetcher),
            config.fetch_interval(),
        )?
        .with_filter_keywords(config.sync.filter_keywords.clone()))
    }

    /// Keywords for sources that have none of their own
    pub fn with_filter_keywords(mut self, keywords: Vec<String>) -> Self {
        self.filter_keywords = keywords;
        self
    }

    /// Fetch on every interval until shutdown. Returns `Err(Error::Cancelled)` once stopped.
    pub async fn start(&self, shutdown: Shutdown) -> Result<()> {
        self.task
            .run(shutdown, move || async move { self.fetch_once().await.map(|_| ()) })
            .await
    }

    /// One pass over all sources. A failing source is recorded in the report
    /// and does not stop the others.
    pub async fn fetch_once(&self) -> Result<FetchReport> {
        let sources = self.sources.list_sources().await?;

        let mut report = FetchReport {
            sources: sources.len() as u32,
            ..Default::default()
        };

        for source in &sources {
            if let Err(e) = self.fetch_source(source, &mut report).await {
                warn!(source = %source.name, url = %source.feed_url, error = %e, "Failed to fetch source");
                report.failures.push(SourceFailure {
                    source: source.name.clone(),
                    error: e.to_string(),
                });
            }
        }

        info!(
            sources = report.sources,
            inserted = report.inserted,
            known = report.known,
            filtered = report.filtered,
            failed = report.failures.len(),
            "Fetch finished"
        );

        Ok(report)
    }

    async fn fetch_source(&self, source: &Source, report: &mut FetchReport) -> Result<()> {
        let entries = self.reader.fetch_articles(source).await?;
        let filter = KeywordFilter::for_source(source, &self.filter_keywords);

        debug!(source = %source.name, entries = entries.len(), "Fetched feed");

        for entry in &entries {
            if !filter.matches(entry) {
                report.filtered += 1;
                continue;
            }

            if self.articles.insert_if_absent(entry).await? {
                report.inserted += 1;
            } else {
                report.known += 1;
            }
        }

        Ok(())
    }
}
