use anyhow::{bail, Result};

use newsbot_core::{
    feed::NewSource,
    storage::{Database, SourceRepository},
};

pub async fn add(db: &Database, name: &str, url: &str, priority: i32, keywords: Vec<String>) -> Result<()> {
    let parsed = url::Url::parse(url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("Feed URL must use http or https: {}", url);
    }

    let source_repo = SourceRepository::new(db);
    if let Some(existing) = source_repo.find_by_url(parsed.as_str()).await? {
        println!("Source already registered as '{}' ({}).", existing.name, existing.id);
        return Ok(());
    }

    let keywords: Vec<String> = keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    let source = source_repo
        .create(&NewSource {
            name: name.to_string(),
            feed_url: parsed.to_string(),
            priority,
            keywords,
        })
        .await?;

    println!("Added source: {} ({})", source.name, source.id);
    if !source.keywords.is_empty() {
        println!("  Keywords: {}", source.keywords.join(", "));
    }

    Ok(())
}

pub async fn list(db: &Database) -> Result<()> {
    let sources = SourceRepository::new(db).list_all().await?;

    if sources.is_empty() {
        println!("No sources yet.");
        println!("\nTo add one, run:");
        println!("  newsbot sources add --name <name> --url <feed url>");
        return Ok(());
    }

    println!("Sources ({}):\n", sources.len());

    for source in &sources {
        println!("  {} [priority {}]", source.name, source.priority);
        println!("    ID:  {}", source.id);
        println!("    URL: {}", source.feed_url);
        if !source.keywords.is_empty() {
            println!("    Keywords: {}", source.keywords.join(", "));
        }
        println!();
    }

    Ok(())
}
