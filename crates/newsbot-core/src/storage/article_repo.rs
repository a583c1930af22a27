use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{ArticleStore, CandidateWindow, Database};
use crate::feed::{Article, NewArticle};
use crate::{Error, Result};

/// Repository for article CRUD operations
#[derive(Clone)]
pub struct ArticleRepository {
    db: Database,
}

#[derive(FromRow)]
struct ArticleRow {
    id: String,
    source_id: String,
    title: String,
    link: String,
    summary: Option<String>,
    published_at: DateTime<Utc>,
    discovered_at: DateTime<Utc>,
    posted_at: Option<DateTime<Utc>>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            source_id: Uuid::parse_str(&row.source_id).unwrap_or_default(),
            title: row.title,
            link: row.link,
            summary: row.summary,
            published_at: row.published_at,
            discovered_at: row.discovered_at,
            posted_at: row.posted_at,
        }
    }
}

impl ArticleRepository {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Find an article by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>> {
        let row: Option<ArticleRow> = sqlx::query_as(
            r#"
            SELECT id, source_id, title, link, summary,
                   published_at, discovered_at, posted_at
            FROM articles
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(Article::from))
    }

    /// Count articles still waiting to be posted
    pub async fn count_unposted(&self) -> Result<u32> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles WHERE posted_at IS NULL")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count.0 as u32)
    }
}

#[async_trait]
impl ArticleStore for ArticleRepository {
    async fn insert_if_absent(&self, article: &NewArticle) -> Result<bool> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (id, source_id, title, link, summary, published_at, discovered_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(source_id, link) DO NOTHING
            "#,
        )
        .bind(id.to_string())
        .bind(article.source_id.to_string())
        .bind(&article.title)
        .bind(&article.link)
        .bind(&article.summary)
        .bind(article.published_at.unwrap_or(now))
        .bind(now)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_candidate(&self, window: &CandidateWindow) -> Result<Option<Article>> {
        let row: Option<ArticleRow> = sqlx::query_as(
            r#"
            SELECT id, source_id, title, link, summary,
                   published_at, discovered_at, posted_at
            FROM articles
            WHERE posted_at IS NULL
              AND published_at >= ?
              AND published_at <= ?
            ORDER BY published_at DESC, discovered_at DESC
            LIMIT 1
            "#,
        )
        .bind(window.from)
        .bind(window.to)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(Article::from))
    }

    async fn mark_posted(&self, id: Uuid) -> Result<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE articles
            SET posted_at = ?
            WHERE id = ? AND posted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(id.to_string())
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 && self.find_by_id(id).await?.is_none() {
            return Err(Error::ArticleNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn list_posted(&self, limit: u32) -> Result<Vec<Article>> {
        let rows: Vec<ArticleRow> = sqlx::query_as(
            r#"
            SELECT id, source_id, title, link, summary,
                   published_at, discovered_at, posted_at
            FROM articles
            WHERE posted_at IS NOT NULL
            ORDER BY posted_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::NewSource;
    use crate::storage::SourceRepository;
    use chrono::{Duration, TimeZone};

    async fn setup() -> (ArticleRepository, Uuid) {
        let db = Database::new_in_memory().await.unwrap();
        let source = SourceRepository::new(&db)
            .create(&NewSource {
                name: "S".to_string(),
                feed_url: "https://example.com/feed.xml".to_string(),
                priority: 0,
                keywords: Vec::new(),
            })
            .await
            .unwrap();

        (ArticleRepository::new(&db), source.id)
    }

    fn new_article(source_id: Uuid, link: &str, published_at: DateTime<Utc>) -> NewArticle {
        NewArticle {
            source_id,
            title: format!("Title of {}", link),
            link: link.to_string(),
            summary: Some("Body".to_string()),
            published_at: Some(published_at),
        }
    }

    fn window_at(now: DateTime<Utc>, secs: u64) -> CandidateWindow {
        CandidateWindow::ending_at(now, std::time::Duration::from_secs(secs))
    }

    #[tokio::test]
    async fn test_insert_if_absent_is_idempotent() {
        let (repo, source_id) = setup().await;
        let now = Utc::now();

        let first = new_article(source_id, "https://example.com/a", now);
        assert!(repo.insert_if_absent(&first).await.unwrap());

        let mut second = first.clone();
        second.title = "Changed title".to_string();
        assert!(!repo.insert_if_absent(&second).await.unwrap());

        let stored = repo.find_candidate(&window_at(now, 60)).await.unwrap().unwrap();
        assert_eq!(stored.title, "Title of https://example.com/a");
        assert_eq!(repo.count_unposted().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_same_link_in_other_source_is_distinct() {
        let (repo, source_id) = setup().await;
        let other = SourceRepository::new(&repo.db)
            .create(&NewSource {
                name: "T".to_string(),
                feed_url: "https://other.example.com/feed.xml".to_string(),
                priority: 0,
                keywords: Vec::new(),
            })
            .await
            .unwrap();

        let now = Utc::now();
        assert!(repo.insert_if_absent(&new_article(source_id, "https://x.com/1", now)).await.unwrap());
        assert!(repo.insert_if_absent(&new_article(other.id, "https://x.com/1", now)).await.unwrap());
        assert_eq!(repo.count_unposted().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_published_at_falls_back_to_discovery() {
        let (repo, source_id) = setup().await;
        let mut article = new_article(source_id, "https://example.com/undated", Utc::now());
        article.published_at = None;

        assert!(repo.insert_if_absent(&article).await.unwrap());
        let stored = repo.find_candidate(&window_at(Utc::now(), 60)).await.unwrap().unwrap();
        assert_eq!(stored.published_at, stored.discovered_at);
    }

    #[tokio::test]
    async fn test_find_candidate_prefers_most_recent() {
        let (repo, source_id) = setup().await;
        let now = Utc::now();

        repo.insert_if_absent(&new_article(source_id, "https://example.com/old", now - Duration::seconds(90))).await.unwrap();
        repo.insert_if_absent(&new_article(source_id, "https://example.com/new", now - Duration::seconds(10))).await.unwrap();
        repo.insert_if_absent(&new_article(source_id, "https://example.com/mid", now - Duration::seconds(50))).await.unwrap();

        let candidate = repo.find_candidate(&window_at(now, 120)).await.unwrap().unwrap();
        assert_eq!(candidate.link, "https://example.com/new");
    }

    #[tokio::test]
    async fn test_find_candidate_skips_posted_and_empty_window() {
        let (repo, source_id) = setup().await;
        let now = Utc::now();

        assert!(repo.find_candidate(&window_at(now, 120)).await.unwrap().is_none());

        repo.insert_if_absent(&new_article(source_id, "https://example.com/a", now - Duration::seconds(5))).await.unwrap();
        let candidate = repo.find_candidate(&window_at(now, 120)).await.unwrap().unwrap();
        repo.mark_posted(candidate.id).await.unwrap();

        assert!(repo.find_candidate(&window_at(now, 120)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookback_window_scenario() {
        // fetch interval 60s, multiplier 2: the window is 120s
        let (repo, source_id) = setup().await;
        let t0 = Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap();

        repo.insert_if_absent(&new_article(source_id, "https://example.com/a", t0)).await.unwrap();

        for offset in [30, 60, 90, 120] {
            let candidate = repo
                .find_candidate(&window_at(t0 + Duration::seconds(offset), 120))
                .await
                .unwrap();
            assert!(candidate.is_some(), "expected a candidate at t={}", offset);
        }

        let expired = repo
            .find_candidate(&window_at(t0 + Duration::seconds(125), 120))
            .await
            .unwrap();
        assert!(expired.is_none());

        // Not selectable before publication either
        let early = repo
            .find_candidate(&window_at(t0 - Duration::seconds(1), 120))
            .await
            .unwrap();
        assert!(early.is_none());
    }

    #[tokio::test]
    async fn test_mark_posted_is_monotonic() {
        let (repo, source_id) = setup().await;
        let now = Utc::now();
        repo.insert_if_absent(&new_article(source_id, "https://example.com/a", now)).await.unwrap();
        let article = repo.find_candidate(&window_at(now, 60)).await.unwrap().unwrap();

        repo.mark_posted(article.id).await.unwrap();
        let first = repo.find_by_id(article.id).await.unwrap().unwrap().posted_at.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.mark_posted(article.id).await.unwrap();
        let second = repo.find_by_id(article.id).await.unwrap().unwrap().posted_at.unwrap();
        assert_eq!(first, second);

        // Re-fetching a posted article neither duplicates nor resets it
        assert!(!repo.insert_if_absent(&new_article(source_id, "https://example.com/a", now)).await.unwrap());
        assert!(repo.find_by_id(article.id).await.unwrap().unwrap().is_posted());
    }

    #[tokio::test]
    async fn test_mark_posted_unknown_article() {
        let (repo, _) = setup().await;
        let result = repo.mark_posted(Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::ArticleNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_posted_most_recent_first() {
        let (repo, source_id) = setup().await;
        let now = Utc::now();

        for link in ["https://example.com/1", "https://example.com/2", "https://example.com/3"] {
            repo.insert_if_absent(&new_article(source_id, link, now)).await.unwrap();
        }

        let first = repo.find_candidate(&window_at(now, 60)).await.unwrap().unwrap();
        repo.mark_posted(first.id).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo.find_candidate(&window_at(now, 60)).await.unwrap().unwrap();
        repo.mark_posted(second.id).await.unwrap();

        let posted = repo.list_posted(10).await.unwrap();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0].id, second.id);
        assert_eq!(posted[1].id, first.id);
        assert_eq!(repo.list_posted(1).await.unwrap().len(), 1);
        assert_eq!(repo.count_unposted().await.unwrap(), 1);
    }
}
