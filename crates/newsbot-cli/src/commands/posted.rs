use anyhow::Result;

use newsbot_core::storage::{ArticleRepository, ArticleStore, Database};

pub async fn run(db: &Database, limit: u32) -> Result<()> {
    let article_repo = ArticleRepository::new(db);
    let articles = article_repo.list_posted(limit).await?;

    if articles.is_empty() {
        let queued = article_repo.count_unposted().await?;
        println!("Nothing published yet ({} articles waiting).", queued);
        return Ok(());
    }

    for article in &articles {
        let posted = article
            .posted_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("  {}  {}", posted, article.title);
        println!("    {}", article.link);
    }

    Ok(())
}
