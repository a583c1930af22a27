mod fetch_loop;
mod notify_loop;
mod periodic;
mod service;
mod shutdown;

#[cfg(test)]
mod test_support;

pub use fetch_loop::{FetchLoop, FetchReport, SourceFailure};
pub use notify_loop::{NotificationLoop, NotifyOutcome};
pub use periodic::PeriodicTask;
pub use service::SchedulerService;
pub use shutdown::{shutdown_channel, Shutdown, ShutdownTrigger};
