use std::sync::Arc;

use anyhow::Result;

use newsbot_core::{
    feed::FeedFetcher,
    publish::TelegramPublisher,
    scheduler::{NotificationLoop, NotifyOutcome},
    storage::{ArticleRepository, Database},
    AppConfig,
};

/// Build the notification loop against the real store, Telegram and HTTP fetcher
pub fn notification_loop(db: &Database, config: &AppConfig) -> Result<NotificationLoop> {
    let publisher = TelegramPublisher::new(&config.telegram)?;
    let reader = FeedFetcher::new(config)?;

    Ok(NotificationLoop::from_config(
        config,
        Arc::new(ArticleRepository::new(db)),
        Arc::new(publisher),
        Arc::new(reader),
    )?)
}

pub async fn run(db: &Database, config: &AppConfig) -> Result<()> {
    let notifier = notification_loop(db, config)?;

    match notifier.send_next().await? {
        NotifyOutcome::Idle => println!("Nothing to post: no unposted articles in the lookback window."),
        NotifyOutcome::Posted(id) => println!("Published article {}.", id),
        NotifyOutcome::SummarizeFailed(id) => {
            println!("Could not summarize article {}. It stays queued.", id)
        }
        NotifyOutcome::PublishFailed(id) => {
            println!("Could not publish article {}. It stays queued.", id)
        }
        NotifyOutcome::MarkFailed(id) => {
            println!("Published article {}, but failed to mark it as posted.", id);
            println!("It may be published again.");
        }
    }

    Ok(())
}
