use chrono::{DateTime, Utc};
use feed_rs::parser;
use uuid::Uuid;

use super::models::NewArticle;
use crate::{Error, Result};

/// Parse RSS/Atom feed content into articles owned by `source_id`.
/// Entries without any usable link are dropped since the link is part of the
/// dedup key.
pub fn parse_feed(content: &[u8], source_id: Uuid) -> Result<Vec<NewArticle>> {
    let feed = parser::parse(content)
        .map_err(|e| Error::FeedParse(e.to_string()))?;

    let articles = feed.entries.into_iter().filter_map(|entry| {
        let link = entry.links.first()
            .map(|l| l.href.trim().to_string())
            .filter(|href| !href.is_empty())
            .or_else(|| {
                // Some RSS feeds only carry a permalink guid
                let id = entry.id.trim();
                (id.starts_with("http://") || id.starts_with("https://"))
                    .then(|| id.to_string())
            })?;

        let title = entry.title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        let summary = entry.summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .map(|html| html_to_text(&html))
            .filter(|text| !text.is_empty());

        let published_at = entry.published
            .or(entry.updated)
            .map(|dt| DateTime::<Utc>::from(dt));

        Some(NewArticle {
            source_id,
            title,
            link,
            summary,
            published_at,
        })
    }).collect();

    Ok(articles)
}

/// Convert HTML content to plain text
pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 120)
        .map(|text| text.trim().to_string())
        .unwrap_or_else(|_| html.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <link>https://example.com</link>
    <description>Example feed</description>
    <item>
      <title>New GPU released</title>
      <link>https://example.com/gpu</link>
      <description>&lt;p&gt;A &lt;b&gt;faster&lt;/b&gt; card.&lt;/p&gt;</description>
      <pubDate>Mon, 06 Jan 2025 10:00:00 +0000</pubDate>
    </item>
    <item>
      <title>Permalink only</title>
      <guid isPermaLink="true">https://example.com/permalink</guid>
    </item>
    <item>
      <title>No link at all</title>
      <guid isPermaLink="false">tag-123</guid>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_items() {
        let source_id = Uuid::new_v4();
        let articles = parse_feed(RSS.as_bytes(), source_id).unwrap();

        assert_eq!(articles.len(), 2);

        let gpu = &articles[0];
        assert_eq!(gpu.source_id, source_id);
        assert_eq!(gpu.title, "New GPU released");
        assert_eq!(gpu.link, "https://example.com/gpu");
        assert!(gpu.summary.as_deref().unwrap().contains("faster"));
        assert!(!gpu.summary.as_deref().unwrap().contains("<b>"));
        assert_eq!(
            gpu.published_at.unwrap(),
            "2025-01-06T10:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );

        let permalink = &articles[1];
        assert_eq!(permalink.link, "https://example.com/permalink");
        assert!(permalink.published_at.is_none());
        assert!(permalink.summary.is_none());
    }

    #[test]
    fn test_parse_invalid_feed() {
        let result = parse_feed(b"not a feed", Uuid::new_v4());
        assert!(matches!(result, Err(Error::FeedParse(_))));
    }
}
