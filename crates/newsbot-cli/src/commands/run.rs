use anyhow::Result;
use tracing::info;

use newsbot_core::{
    scheduler::{shutdown_channel, FetchLoop, SchedulerService, ShutdownTrigger},
    storage::Database,
    AppConfig,
};

use super::post_now::notification_loop;

/// Run both loops until Ctrl+C or SIGTERM
pub async fn run(db: Database, config: AppConfig) -> Result<()> {
    let fetch_loop = FetchLoop::from_config(&db, &config)?;
    let notification_loop = notification_loop(&db, &config)?;
    let scheduler = SchedulerService::new(fetch_loop, notification_loop);

    let (trigger, shutdown) = shutdown_channel();
    tokio::spawn(wait_for_signal(trigger));

    println!("newsbot started (PID: {}). Press Ctrl+C to stop.", std::process::id());
    println!("  Fetch interval: {} seconds", config.sync.fetch_interval_secs);
    println!("  Notification interval: {} seconds", config.sync.notification_interval_secs);
    println!("  Lookback window: {} seconds", config.lookback_window().as_secs());
    if !config.ai.enabled {
        println!("  AI summarization disabled, posting feed excerpts");
    }

    // Blocks until shutdown
    scheduler.run(shutdown).await?;

    println!("newsbot stopped.");
    Ok(())
}

async fn wait_for_signal(trigger: ShutdownTrigger) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }

    info!("Received shutdown signal");
    trigger.trigger();
}
