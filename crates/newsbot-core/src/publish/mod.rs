pub mod markup;
mod telegram;

pub use telegram::TelegramPublisher;

use async_trait::async_trait;

use crate::Result;

/// Destination for finished posts
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send already formatted (MarkdownV2) text to `channel_id`
    async fn publish(&self, channel_id: &str, text: &str) -> Result<()>;
}
