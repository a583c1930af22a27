use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::Shutdown;
use crate::{Error, Result};

/// A cancellable fixed-interval task.
///
/// The first tick runs immediately. A tick always finishes (or is cancelled)
/// before the next one starts; ticks missed while a slow tick was running are
/// delayed rather than fired back to back. Both the wait between ticks and the
/// tick itself are raced against the shutdown signal.
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    name: &'static str,
    period: Duration,
}

impl PeriodicTask {
    pub fn new(name: &'static str, period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::Config(format!("{} interval must be greater than zero", name)));
        }
        Ok(Self { name, period })
    }

    /// Run `tick` until shutdown. Always ends with `Err(Error::Cancelled)`.
    /// Tick errors are logged and do not stop the task.
    pub async fn run<F, Fut>(&self, mut shutdown: Shutdown, mut tick: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if shutdown.is_triggered() {
            return Err(Error::Cancelled);
        }

        info!(task = self.name, period_secs = self.period.as_secs_f64(), "Periodic task started");

        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                _ = interval.tick() => {}
            }

            debug!(task = self.name, "Running tick");

            tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                result = tick() => match result {
                    Ok(()) => {}
                    Err(e) if e.is_cancelled() => break,
                    Err(e) => error!(task = self.name, error = %e, "Tick failed"),
                },
            }
        }

        info!(task = self.name, "Periodic task stopped");
        Err(Error::Cancelled)
    }
}
