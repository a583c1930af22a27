mod fetcher;
mod filter;
mod models;
mod parser;

pub use fetcher::{FeedFetcher, FeedReader};
pub use filter::KeywordFilter;
pub use models::{Article, NewArticle, NewSource, Source};
pub use parser::{html_to_text, parse_feed};
