use anyhow::Result;

use newsbot_core::{scheduler::FetchLoop, storage::Database, AppConfig};

pub async fn run(db: &Database, config: &AppConfig) -> Result<()> {
    println!("Fetching all sources...\n");

    let report = FetchLoop::from_config(db, config)?.fetch_once().await?;

    for failure in &report.failures {
        println!("  {} failed: {}", failure.source, failure.error);
    }

    println!(
        "\nFetch complete. {} sources, {} new articles, {} already known, {} filtered out.",
        report.sources, report.inserted, report.known, report.filtered
    );

    Ok(())
}
