//! Feedbeat - RSS/Atom feed notifications for chat channels.
//!
//! Polls subscribed feeds on a heartbeat, diffs each feed against the
//! last-seen snapshot, and posts new entries to the subscribed channel.

pub mod commands;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod heartbeat;
pub mod logging;
pub mod render;
pub mod sink;
pub mod store;
pub mod subscriptions;

pub use commands::{CommandHandler, FeedCommand};
pub use config::Config;
pub use error::{FeedbeatError, Result};
pub use feed::{BodyKind, Entry, EntryBody, EntryLink, FeedDocument, FeedFormat};
pub use fetcher::{FetchFeed, HttpFetcher};
pub use heartbeat::{shutdown_channel, Heartbeat};
pub use render::render_entry;
pub use sink::{PostSink, WebhookSink};
pub use store::Database;
pub use subscriptions::{Subscription, SubscriptionStore};
