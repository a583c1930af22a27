use std::sync::Arc;

use tokio::task::JoinError;
use tracing::{error, info};

use super::{shutdown_channel, FetchLoop, NotificationLoop, Shutdown};
use crate::{Error, Result};

/// Runs the fetch and notification loops side by side until shutdown
pub struct SchedulerService {
    fetch_loop: Arc<FetchLoop>,
    notification_loop: Arc<NotificationLoop>,
}

impl SchedulerService {
    pub fn new(fetch_loop: FetchLoop, notification_loop: NotificationLoop) -> Self {
        Self {
            fetch_loop: Arc::new(fetch_loop),
            notification_loop: Arc::new(notification_loop),
        }
    }

    /// Spawn both loops and wait for them to stop.
    /// Returns `Ok(())` when both ended because of the shutdown signal. If one
    /// loop dies first, the other is stopped and the failure is returned.
    pub async fn run(self, mut shutdown: Shutdown) -> Result<()> {
        info!("Scheduler started");

        // The loops listen on their own signal so a dead loop can stop its sibling
        let (stop_loops, loops_shutdown) = shutdown_channel();

        let mut fetch = {
            let fetch_loop = self.fetch_loop.clone();
            let shutdown = loops_shutdown.clone();
            tokio::spawn(async move { fetch_loop.start(shutdown).await })
        };

        let mut notify = {
            let notification_loop = self.notification_loop.clone();
            tokio::spawn(async move { notification_loop.start(loops_shutdown).await })
        };

        let (fetch, notify) = tokio::select! {
            _ = shutdown.triggered() => {
                stop_loops.trigger();
                tokio::join!(fetch, notify)
            }
            fetch_result = &mut fetch => {
                stop_loops.trigger();
                (fetch_result, notify.await)
            }
            notify_result = &mut notify => {
                stop_loops.trigger();
                (fetch.await, notify_result)
            }
        };

        let fetch = settle("fetch", fetch);
        let notify = settle("notification", notify);

        info!("Scheduler stopped");
        fetch.and(notify)
    }
}

/// Cancellation is the normal way for a loop to end
fn settle(name: &str, joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) if e.is_cancelled() => {
            info!(task = name, "Loop stopped");
            Ok(())
        }
        Ok(Err(e)) => {
            error!(task = name, error = %e, "Loop failed");
            Err(e)
        }
        Err(e) => {
            error!(task = name, error = %e, "Loop panicked");
            Err(Error::Other(format!("{} loop panicked: {}", name, e)))
        }
    }
}
