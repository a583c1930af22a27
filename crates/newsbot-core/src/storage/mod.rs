mod article_repo;
mod database;
mod source_repo;
mod window;

pub use article_repo::ArticleRepository;
pub use database::Database;
pub use source_repo::SourceRepository;
pub use window::CandidateWindow;

use async_trait::async_trait;
use uuid::Uuid;

use crate::feed::{Article, NewArticle, Source};
use crate::Result;

/// Read side of the configured sources, as seen by the fetch loop
#[async_trait]
pub trait SourceRegistry: Send + Sync {
    /// All sources in a stable order (priority descending, then oldest first)
    async fn list_sources(&self) -> Result<Vec<Source>>;
}

/// Durable article state shared by the fetch and notification loops
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert unless `(source_id, link)` is already known.
    /// Returns `false` for a known article; the stored row is left untouched.
    async fn insert_if_absent(&self, article: &NewArticle) -> Result<bool>;

    /// The most recently published unposted article inside `window`
    async fn find_candidate(&self, window: &CandidateWindow) -> Result<Option<Article>>;

    /// Set the posted timestamp. An already posted article keeps its original timestamp.
    async fn mark_posted(&self, id: Uuid) -> Result<()>;

    /// Posted articles, most recent first
    async fn list_posted(&self, limit: u32) -> Result<Vec<Article>>;
}
