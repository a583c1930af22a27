use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A configured RSS/Atom feed origin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    pub feed_url: String,
    /// Higher is more important; only affects ordering
    pub priority: i32,
    /// Articles must mention one of these to be kept (empty = keep all)
    #[serde(default)]
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Data required to register a new source
#[derive(Debug, Clone)]
pub struct NewSource {
    pub name: String,
    pub feed_url: String,
    pub priority: i32,
    pub keywords: Vec<String>,
}

/// An article discovered in a source's feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub source_id: Uuid,
    pub title: String,
    pub link: String,
    /// Plain text taken from the feed entry, used as summarizer input
    pub summary: Option<String>,
    pub published_at: DateTime<Utc>,
    pub discovered_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
}

/// An article as read from a feed, before it is stored.
/// `(source_id, link)` is its natural key.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub source_id: Uuid,
    pub title: String,
    pub link: String,
    pub summary: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn is_posted(&self) -> bool {
        self.posted_at.is_some()
    }

    /// Get a preview of the summary text (first N characters)
    pub fn summary_preview(&self, max_len: usize) -> String {
        let text = self.summary.as_deref().unwrap_or("").trim();

        if max_len == 0 {
            return String::new();
        }

        match text.char_indices().nth(max_len) {
            Some((idx, _)) => format!("{}...", text[..idx].trim_end()),
            None => text.to_string(),
        }
    }
}
