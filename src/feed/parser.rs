//! Feed format detection and normalization.
//!
//! Format detection works by trial parsing: each supported format is a
//! capability probe (`try_parse`) attempted in a fixed priority order,
//! RSS 2.0 first, Atom second. The underlying grammar work is delegated
//! to `feed-rs`, which also honors the character set declared by the
//! document, so payloads are handled as raw bytes until parsed.

use feed_rs::model::{self, FeedType};
use feed_rs::parser;

use super::{BodyKind, Entry, EntryBody, EntryLink, FeedDocument};

/// A supported feed format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// RSS 2.0.
    Rss2,
    /// Atom.
    Atom,
}

impl FeedFormat {
    /// Probe order used by [`parse_any`]. RSS 2.0 is tried before Atom.
    pub const PROBE_ORDER: [FeedFormat; 2] = [FeedFormat::Rss2, FeedFormat::Atom];

    /// Try to parse `payload` as this format.
    ///
    /// Returns `None` when the payload does not validate as this format,
    /// either because it is not a feed at all or because it is a feed of
    /// a different format.
    pub fn try_parse(&self, payload: &[u8]) -> Option<FeedDocument> {
        let feed = parser::parse(payload).ok()?;
        if self.accepts(&feed.feed_type) {
            Some(normalize(feed))
        } else {
            None
        }
    }

    fn accepts(&self, feed_type: &FeedType) -> bool {
        matches!(
            (self, feed_type),
            (FeedFormat::Rss2, FeedType::RSS2) | (FeedFormat::Atom, FeedType::Atom)
        )
    }

    /// Human-readable format name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            FeedFormat::Rss2 => "rss2",
            FeedFormat::Atom => "atom",
        }
    }
}

/// Parse `payload` as any supported format, trying each probe in
/// priority order. Returns the normalized document together with the
/// format that validated, or `None` if no format did.
pub fn parse_any(payload: &[u8]) -> Option<(FeedDocument, FeedFormat)> {
    FeedFormat::PROBE_ORDER
        .iter()
        .find_map(|format| format.try_parse(payload).map(|doc| (doc, *format)))
}

/// Map a `feed-rs` feed into the format-agnostic document model.
fn normalize(feed: model::Feed) -> FeedDocument {
    FeedDocument {
        title: feed.title.map(|t| t.content).unwrap_or_default(),
        entries: feed.entries.into_iter().map(normalize_entry).collect(),
    }
}

fn normalize_entry(entry: model::Entry) -> Entry {
    Entry {
        identity: Some(entry.id).filter(|id| !id.is_empty()),
        title: entry.title.map(|t| t.content),
        published: entry.published.or(entry.updated),
        links: entry
            .links
            .into_iter()
            .map(|l| EntryLink {
                rel: l.rel,
                href: l.href,
            })
            .collect(),
        summary: entry.summary.map(|t| EntryBody {
            kind: body_kind(&t.content_type.to_string()),
            text: t.content,
        }),
        content: entry.content.and_then(|c| {
            let kind = body_kind(&c.content_type.to_string());
            c.body.map(|text| EntryBody { kind, text })
        }),
    }
}

/// Plain only for declared plain text; everything else is treated as
/// rich content and run through markdown conversion.
fn body_kind(content_type: &str) -> BodyKind {
    if content_type.starts_with("text/plain") {
        BodyKind::Plain
    } else {
        BodyKind::Html
    }
}
