//! Telegram MarkdownV2 helpers.
//!
//! Every piece of feed-supplied text must go through [`escape_markdown`]
//! before it is placed into a message, otherwise Telegram rejects the whole
//! message with a parse error.

use crate::feed::Article;

/// Telegram rejects longer messages
pub const MAX_MESSAGE_CHARS: usize = 4096;

const MAX_TITLE_CHARS: usize = 512;

const RESERVED: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escape all MarkdownV2 reserved characters
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        if RESERVED.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Escape `text` into at most `max_chars` characters.
///
/// Text that does not fit is cut and ends with an ellipsis. An escape pair is
/// never split, so the result stays valid MarkdownV2.
fn escape_within(text: &str, max_chars: usize) -> String {
    let escaped = escape_markdown(text);
    if escaped.chars().count() <= max_chars {
        return escaped;
    }

    let budget = max_chars.saturating_sub(1);
    let mut cut = String::with_capacity(budget + 4);
    let mut used = 0;
    for ch in text.chars() {
        let reserved = RESERVED.contains(&ch);
        let cost = if reserved { 2 } else { 1 };
        if used + cost > budget {
            break;
        }
        if reserved {
            cut.push('\\');
        }
        cut.push(ch);
        used += cost;
    }

    let mut cut = cut.trim_end().to_string();
    cut.push('…');
    cut
}

/// Channel post for an article: bold title, summary, link.
/// The summary is shortened so the whole post fits in one Telegram message.
pub fn compose_post(article: &Article, summary: &str) -> String {
    let title = escape_within(article.title.trim(), MAX_TITLE_CHARS);
    let link = escape_markdown(&article.link);
    let mut message = format!("*{}*", title);

    let summary = summary.trim();
    let budget = MAX_MESSAGE_CHARS
        .saturating_sub(message.chars().count() + link.chars().count() + 4);
    if !summary.is_empty() && budget > 1 {
        message.push_str("\n\n");
        message.push_str(&escape_within(summary, budget));
    }

    message.push_str("\n\n");
    message.push_str(&link);
    message
}
