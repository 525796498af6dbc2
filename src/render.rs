//! Notification rendering.
//!
//! Turns one feed entry into the markdown message posted to a channel.
//! Every section is gated by a display option, and HTML bodies are
//! converted to markdown before posting.

use crate::config::DisplayConfig;
use crate::feed::{BodyKind, Entry, EntryBody};

/// Render one entry as a markdown message.
///
/// Sections appear in order: feed title, entry title, link, body. A
/// section whose source field is missing or whose display option is off
/// is omitted entirely. Each emitted section ends with a newline.
pub fn render_entry(entry: &Entry, feed_title: &str, display: &DisplayConfig) -> String {
    let mut message = String::new();

    if display.show_feed_title && !feed_title.is_empty() {
        if display.heading_titles {
            message.push_str("##### ");
        }
        message.push_str(feed_title);
        message.push('\n');
    }

    if display.show_entry_title {
        if let Some(title) = entry.title.as_deref().filter(|t| !t.is_empty()) {
            if display.heading_titles {
                message.push_str("###### ");
            }
            message.push_str(title);
            message.push('\n');
        }
    }

    if display.show_link {
        if let Some(link) = entry.primary_link() {
            let link = link.href.trim();
            if !link.is_empty() {
                message.push_str(link);
                message.push('\n');
            }
        }
    }

    if display.show_body {
        if let Some(body) = entry.content.as_ref().or(entry.summary.as_ref()) {
            message.push_str(&render_body(body));
            message.push('\n');
        }
    }

    message
}

fn render_body(body: &EntryBody) -> String {
    match body.kind {
        BodyKind::Plain => body.text.clone(),
        BodyKind::Html => html2md::parse_html(&body.text).trim().to_string(),
    }
}
