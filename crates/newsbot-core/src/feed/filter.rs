use super::models::{NewArticle, Source};

/// Case-insensitive keyword allow-list applied to incoming articles
#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self { keywords }
    }

    /// The source's own keywords win; otherwise fall back to the global list
    pub fn for_source(source: &Source, fallback: &[String]) -> Self {
        let own = Self::new(&source.keywords);
        if own.is_empty() {
            Self::new(fallback)
        } else {
            own
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// An empty filter keeps everything
    pub fn matches(&self, article: &NewArticle) -> bool {
        if self.keywords.is_empty() {
            return true;
        }

        let title = article.title.to_lowercase();
        let summary = article
            .summary
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();

        self.keywords
            .iter()
            .any(|k| title.contains(k.as_str()) || summary.contains(k.as_str()))
    }
}
