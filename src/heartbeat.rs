//! Heartbeat scheduler.
//!
//! Polls every subscription at a fixed interval, diffs each feed
//! against its stored snapshot, posts notifications for new entries,
//! and persists the new snapshot. One failing subscription never stops
//! the pass; shutdown is signalled through a watch channel and is
//! observed at tick boundaries so an in-flight pass completes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::{DisplayConfig, HeartbeatConfig, SinkConfig};
use crate::feed::{diff, parser, FeedDocument};
use crate::fetcher::FetchFeed;
use crate::render::render_entry;
use crate::sink::PostSink;
use crate::subscriptions::{Subscription, SubscriptionStore};
use crate::{FeedbeatError, Result};

/// Create a linked pair of shutdown handles for a heartbeat.
///
/// Send `true` through the sender to stop the loop.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// The polling loop over all subscriptions.
pub struct Heartbeat<F: FetchFeed, S: PostSink> {
    store: Arc<SubscriptionStore>,
    fetcher: F,
    sink: S,
    display: DisplayConfig,
    post_kind: String,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl<F: FetchFeed, S: PostSink> Heartbeat<F, S> {
    pub fn new(
        store: Arc<SubscriptionStore>,
        fetcher: F,
        sink: S,
        heartbeat_config: &HeartbeatConfig,
        display: DisplayConfig,
        sink_config: &SinkConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            fetcher,
            sink,
            display,
            post_kind: sink_config.post_kind.clone(),
            interval: Duration::from_secs(heartbeat_config.effective_interval_mins() * 60),
            shutdown,
        }
    }

    /// Run until shutdown is signalled. The first pass happens one full
    /// interval after startup.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "heartbeat started");

        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first interval tick fires immediately; consume it so the
        // loop waits a full interval before the first pass.
        timer.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    info!("heartbeat stopping");
                    break;
                }
                _ = timer.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// One polling pass over every subscription.
    pub async fn tick(&self) {
        let subscriptions = match self.store.list_all().await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                error!(error = %e, "failed to load subscriptions, skipping pass");
                return;
            }
        };

        debug!(count = subscriptions.len(), "heartbeat pass");

        for subscription in &subscriptions {
            if let Err(e) = self.process_subscription(subscription).await {
                warn!(
                    channel_id = %subscription.channel_id,
                    url = %subscription.url,
                    error = %e,
                    "failed to process subscription"
                );
            }
        }
    }

    /// Poll one subscription: fetch, diff against the snapshot, post
    /// notifications, persist the new snapshot.
    async fn process_subscription(&self, subscription: &Subscription) -> Result<()> {
        let payload = self.fetcher.fetch(&subscription.url).await?;

        let (document, format) = parser::parse_any(&payload).ok_or_else(|| {
            FeedbeatError::UnrecognizedFeedFormat(subscription.url.clone())
        })?;

        // The stored snapshot was written by an earlier poll of the same
        // URL, so it must parse under the same format.
        let old = if subscription.snapshot.is_empty() {
            FeedDocument::default()
        } else {
            format
                .try_parse(&subscription.snapshot)
                .ok_or_else(|| {
                    FeedbeatError::MalformedFeed(format!(
                        "stored snapshot for {} no longer parses as {}",
                        subscription.url,
                        format.name()
                    ))
                })?
        };

        let mut new_entries = diff::new_entries(&old, &document);
        let produced_new = !new_entries.is_empty();

        // On the first successful poll only the newest entry is
        // announced; the snapshot still records the whole document.
        if old.entries.is_empty() {
            new_entries.truncate(1);
        }

        for entry in &new_entries {
            let message = render_entry(entry, &document.title, &self.display);
            if let Err(e) = self
                .sink
                .post(&subscription.channel_id, &message, &self.post_kind)
                .await
            {
                warn!(
                    channel_id = %subscription.channel_id,
                    url = %subscription.url,
                    error = %e,
                    "failed to post notification"
                );
            }
        }

        if produced_new {
            self.store
                .update_snapshot(&subscription.channel_id, &subscription.url, &payload)
                .await?;
        }

        Ok(())
    }
}
