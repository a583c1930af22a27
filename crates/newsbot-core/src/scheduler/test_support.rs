//! In-memory stand-ins for the loop seams.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ai::{AiProvider, SummaryOptions};
use crate::feed::{Article, FeedReader, NewArticle, Source};
use crate::publish::Publisher;
use crate::storage::{ArticleStore, CandidateWindow, SourceRegistry};
use crate::{Error, Result};

pub fn source(name: &str, feed_url: &str, keywords: &[&str]) -> Source {
    Source {
        id: Uuid::new_v4(),
        name: name.to_string(),
        feed_url: feed_url.to_string(),
        priority: 0,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        created_at: Utc::now(),
    }
}

pub fn entry(source: &Source, title: &str, link: &str) -> NewArticle {
    NewArticle {
        source_id: source.id,
        title: title.to_string(),
        link: link.to_string(),
        summary: None,
        published_at: Some(Utc::now()),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub sources: Mutex<Vec<Source>>,
    pub articles: Mutex<Vec<Article>>,
    pub fail_sources: AtomicBool,
    pub fail_mark: AtomicBool,
}

impl MemoryStore {
    pub fn with_sources(sources: Vec<Source>) -> Self {
        Self {
            sources: Mutex::new(sources),
            ..Default::default()
        }
    }

    pub fn add_article(&self, title: &str, summary: Option<&str>, published_at: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        self.articles.lock().unwrap().push(Article {
            id,
            source_id: Uuid::new_v4(),
            title: title.to_string(),
            link: format!("https://news.example.com/{}", id),
            summary: summary.map(str::to_string),
            published_at,
            discovered_at: Utc::now(),
            posted_at: None,
        });
        id
    }

    pub fn article(&self, id: Uuid) -> Option<Article> {
        self.articles.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.articles.lock().unwrap().len()
    }
}

#[async_trait]
impl SourceRegistry for MemoryStore {
    async fn list_sources(&self) -> Result<Vec<Source>> {
        if self.fail_sources.load(Ordering::SeqCst) {
            return Err(Error::Other("source registry unavailable".to_string()));
        }
        Ok(self.sources.lock().unwrap().clone())
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn insert_if_absent(&self, article: &NewArticle) -> Result<bool> {
        let mut articles = self.articles.lock().unwrap();
        let known = articles
            .iter()
            .any(|a| a.source_id == article.source_id && a.link == article.link);
        if known {
            return Ok(false);
        }

        let now = Utc::now();
        articles.push(Article {
            id: Uuid::new_v4(),
            source_id: article.source_id,
            title: article.title.clone(),
            link: article.link.clone(),
            summary: article.summary.clone(),
            published_at: article.published_at.unwrap_or(now),
            discovered_at: now,
            posted_at: None,
        });
        Ok(true)
    }

    async fn find_candidate(&self, window: &CandidateWindow) -> Result<Option<Article>> {
        Ok(self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| !a.is_posted() && window.contains(a.published_at))
            .max_by_key(|a| a.published_at)
            .cloned())
    }

    async fn mark_posted(&self, id: Uuid) -> Result<()> {
        if self.fail_mark.load(Ordering::SeqCst) {
            return Err(Error::Other("database is locked".to_string()));
        }
        let mut articles = self.articles.lock().unwrap();
        let article = articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::ArticleNotFound(id.to_string()))?;
        if article.posted_at.is_none() {
            article.posted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn list_posted(&self, limit: u32) -> Result<Vec<Article>> {
        let mut posted: Vec<Article> = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.is_posted())
            .cloned()
            .collect();
        posted.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        posted.truncate(limit as usize);
        Ok(posted)
    }
}

/// Serves fixed entries per feed URL
#[derive(Default)]
pub struct StubReader {
    pub entries: Mutex<Vec<NewArticle>>,
    pub broken_feeds: HashSet<String>,
    pub page_text: Option<String>,
    pub stall: bool,
    pub panic_on_fetch: bool,
}

#[async_trait]
impl FeedReader for StubReader {
    async fn fetch_articles(&self, source: &Source) -> Result<Vec<NewArticle>> {
        if self.stall {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.panic_on_fetch {
            panic!("reader crashed on {}", source.feed_url);
        }
        if self.broken_feeds.contains(&source.feed_url) {
            return Err(Error::FeedParse(format!("{} is not a feed", source.feed_url)));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.source_id == source.id)
            .cloned()
            .collect())
    }

    async fn fetch_page_text(&self, url: &str) -> Result<String> {
        self.page_text
            .clone()
            .ok_or_else(|| Error::Other(format!("no page for {}", url)))
    }
}

/// Records every message instead of sending it
#[derive(Default)]
pub struct RecordingPublisher {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingPublisher {
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, text)| text.clone()).collect()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, channel_id: &str, text: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Publish("Bad Request: chat not found".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Returns a fixed summary and remembers its inputs
#[derive(Default)]
pub struct ScriptedProvider {
    pub inputs: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl AiProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn summarize(&self, text: &str, _options: &SummaryOptions) -> Result<String> {
        self.inputs.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(Error::AiProvider("rate limited".to_string()));
        }
        Ok("A short summary. With a dangling".to_string())
    }
}

pub fn summary_options() -> SummaryOptions {
    SummaryOptions {
        model: "test-model".to_string(),
        prompt: "Summarize: {text}".to_string(),
        max_tokens: 64,
        max_input_chars: 1000,
    }
}
