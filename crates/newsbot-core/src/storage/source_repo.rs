use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Database, SourceRegistry};
use crate::feed::{NewSource, Source};
use crate::{Error, Result};

/// Repository for source CRUD operations
#[derive(Clone)]
pub struct SourceRepository {
    db: Database,
}

#[derive(FromRow)]
struct SourceRow {
    id: String,
    name: String,
    feed_url: String,
    priority: i64,
    keywords: String,
    created_at: DateTime<Utc>,
}

impl From<SourceRow> for Source {
    fn from(row: SourceRow) -> Self {
        Source {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            name: row.name,
            feed_url: row.feed_url,
            priority: row.priority as i32,
            keywords: serde_json::from_str(&row.keywords).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

impl SourceRepository {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Register a new source
    pub async fn create(&self, new_source: &NewSource) -> Result<Source> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let keywords = serde_json::to_string(&new_source.keywords)?;

        sqlx::query(
            r#"
            INSERT INTO sources (id, name, feed_url, priority, keywords, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&new_source.name)
        .bind(&new_source.feed_url)
        .bind(new_source.priority)
        .bind(keywords)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            Error::SourceNotFound(id.to_string())
        })
    }

    /// Find a source by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Source>> {
        let row: Option<SourceRow> = sqlx::query_as(
            r#"
            SELECT id, name, feed_url, priority, keywords, created_at
            FROM sources
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(Source::from))
    }

    /// Find a source by feed URL
    pub async fn find_by_url(&self, url: &str) -> Result<Option<Source>> {
        let row: Option<SourceRow> = sqlx::query_as(
            r#"
            SELECT id, name, feed_url, priority, keywords, created_at
            FROM sources
            WHERE feed_url = ?
            "#,
        )
        .bind(url)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(Source::from))
    }

    /// Get all sources, most important first
    pub async fn list_all(&self) -> Result<Vec<Source>> {
        let rows: Vec<SourceRow> = sqlx::query_as(
            r#"
            SELECT id, name, feed_url, priority, keywords, created_at
            FROM sources
            ORDER BY priority DESC, created_at ASC, id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(Source::from).collect())
    }

    /// Get total source count
    pub async fn count(&self) -> Result<u32> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sources")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count.0 as u32)
    }
}

#[async_trait]
impl SourceRegistry for SourceRepository {
    async fn list_sources(&self) -> Result<Vec<Source>> {
        self.list_all().await
    }
}
