pub mod providers;
mod summarizer;

pub use providers::{AiProvider, SummaryOptions};
pub use summarizer::Summarizer;
