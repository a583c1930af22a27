use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsbot_core::{storage::Database, AppConfig};

mod commands;

#[derive(Parser)]
#[command(name = "newsbot")]
#[command(author, version, about = "Publishes AI summaries of RSS/Atom articles to a Telegram channel")]
struct Cli {
    /// Path to the config file (default: ~/.config/newsbot/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fetch and notification loops until Ctrl+C or SIGTERM
    Run,
    /// Fetch every source once
    Fetch,
    /// Summarize and publish the next unposted article now
    PostNow,
    /// Manage feed sources
    Sources {
        #[command(subcommand)]
        action: SourcesAction,
    },
    /// Show recently published articles
    Posted {
        /// Number of articles to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum SourcesAction {
    /// Register a new feed source
    Add {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// RSS/Atom feed URL
        #[arg(short, long)]
        url: String,
        /// Higher priority sources are fetched first
        #[arg(short, long, default_value_t = 0)]
        priority: i32,
        /// Only keep articles mentioning one of these (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,
    },
    /// List registered sources
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    config.validate()?;

    // Initialize database
    let db = Database::new(&config).await?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(db, config).await,
        Some(Commands::Fetch) => commands::fetch::run(&db, &config).await,
        Some(Commands::PostNow) => commands::post_now::run(&db, &config).await,
        Some(Commands::Sources { action }) => match action {
            SourcesAction::Add {
                name,
                url,
                priority,
                keywords,
            } => commands::sources::add(&db, &name, &url, priority, keywords).await,
            SourcesAction::List => commands::sources::list(&db).await,
        },
        Some(Commands::Posted { limit }) => commands::posted::run(&db, limit).await,
    }
}
