//! Feed document model for feedbeat.
//!
//! A [`FeedDocument`] is the normalized, format-agnostic form of a parsed
//! RSS 2.0 or Atom payload. The diff engine ([`diff`]) operates on this
//! model only and never sees the source format.

pub mod diff;
pub mod parser;

pub use parser::FeedFormat;

use chrono::{DateTime, Utc};

/// A normalized feed: title plus entries in document order.
///
/// The default value is the empty document, representing a feed that has
/// never been polled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedDocument {
    /// Feed title.
    pub title: String,
    /// Entries, preserving source order (typically newest first).
    pub entries: Vec<Entry>,
}

/// One item/post within a feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    /// Globally unique identifier (RSS guid or Atom id), if the feed
    /// provides one.
    pub identity: Option<String>,
    /// Entry title.
    pub title: Option<String>,
    /// Publication timestamp, used as an opaque comparable token by the
    /// diff engine.
    pub published: Option<DateTime<Utc>>,
    /// Links in document order.
    pub links: Vec<EntryLink>,
    /// Short summary (RSS description or Atom summary).
    pub summary: Option<EntryBody>,
    /// Full content (Atom content), when present.
    pub content: Option<EntryBody>,
}

impl Entry {
    /// Create an entry with the given identity.
    pub fn with_identity(id: impl Into<String>) -> Self {
        Self {
            identity: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the publication timestamp.
    pub fn published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }

    /// Append a link.
    pub fn link(mut self, rel: Option<&str>, href: impl Into<String>) -> Self {
        self.links.push(EntryLink {
            rel: rel.map(str::to_string),
            href: href.into(),
        });
        self
    }

    /// The primary link: the first one whose relation is absent or
    /// marks it as the alternate representation.
    pub fn primary_link(&self) -> Option<&EntryLink> {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
    }
}

/// A link attached to an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryLink {
    /// Link relation (e.g. `alternate`), if declared.
    pub rel: Option<String>,
    /// Target URL.
    pub href: String,
}

/// Entry body text with its content kind.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryBody {
    /// Whether the text is plain or rich (HTML).
    pub kind: BodyKind,
    /// The body text.
    pub text: String,
}

impl EntryBody {
    /// Plain-text body.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: BodyKind::Plain,
            text: text.into(),
        }
    }

    /// HTML body.
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            kind: BodyKind::Html,
            text: text.into(),
        }
    }
}

/// Content kind of an entry body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Plain text, rendered verbatim.
    Plain,
    /// Rich/HTML text, converted to markdown before rendering.
    Html,
}
