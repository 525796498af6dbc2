//! Subscription store for feedbeat.
//!
//! Durable mapping from (channel, feed URL) to subscription state. The
//! whole table is serialized as one JSON blob under a single well-known
//! key in the key/value substrate, so every operation is a full-table
//! read, in-memory mutation, full-table write. A single async write
//! lock serializes writers so a command-triggered subscribe racing a
//! heartbeat update cannot lose the other's change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::store::Database;
use crate::{FeedbeatError, Result};

/// Storage key for the serialized subscription table.
pub const SUBSCRIPTIONS_KEY: &str = "subscriptions";

/// A durable binding of one channel to one feed URL plus the raw payload
/// of the last successful poll that produced new entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Channel that receives notifications.
    pub channel_id: String,
    /// Feed URL.
    pub url: String,
    /// Last-seen raw feed payload, stored verbatim. Feeds declare their
    /// own character set, so the bytes are kept untouched (base64 in the
    /// serialized table) and handed back to the parser as fetched. Empty
    /// until the first poll that yields new entries.
    #[serde(default, with = "snapshot_bytes")]
    pub snapshot: Vec<u8>,
}

mod snapshot_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

impl Subscription {
    /// Create a subscription with an empty snapshot.
    pub fn new(channel_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            url: url.into(),
            snapshot: Vec::new(),
        }
    }

    fn is(&self, channel_id: &str, url: &str) -> bool {
        self.channel_id == channel_id && self.url == url
    }
}

/// The persisted table. Keyed structurally by (channel_id, url); at most
/// one subscription per distinct pair.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SubscriptionTable {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionTable {
    fn position(&self, channel_id: &str, url: &str) -> Option<usize> {
        self.subscriptions.iter().position(|s| s.is(channel_id, url))
    }
}

/// Store for subscription CRUD over the key/value substrate.
pub struct SubscriptionStore {
    db: Arc<Database>,
    write_lock: Mutex<()>,
}

impl SubscriptionStore {
    /// Create a new SubscriptionStore over the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the full table. A missing blob is an empty table; a blob
    /// that fails to deserialize is `StorageCorrupt`, never silently
    /// reset.
    async fn load(&self) -> Result<SubscriptionTable> {
        match self.db.kv_get(SUBSCRIPTIONS_KEY).await? {
            None => Ok(SubscriptionTable::default()),
            Some(blob) => serde_json::from_slice(&blob)
                .map_err(|e| FeedbeatError::StorageCorrupt(e.to_string())),
        }
    }

    /// Write the full table back.
    async fn save(&self, table: &SubscriptionTable) -> Result<()> {
        let blob = serde_json::to_vec(table)
            .map_err(|e| FeedbeatError::Database(e.to_string()))?;
        self.db.kv_set(SUBSCRIPTIONS_KEY, &blob).await
    }

    /// Subscribe a channel to a feed URL.
    ///
    /// Returns `true` if a new subscription was created, `false` if the
    /// pair was already subscribed. Re-subscribing is a no-op and never
    /// resets an existing snapshot.
    pub async fn subscribe(&self, channel_id: &str, url: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.load().await?;
        if table.position(channel_id, url).is_some() {
            return Ok(false);
        }

        table.subscriptions.push(Subscription::new(channel_id, url));
        self.save(&table).await?;
        Ok(true)
    }

    /// Remove a subscription. Returns `true` if one was removed; an
    /// absent pair is a no-op, not an error.
    pub async fn unsubscribe(&self, channel_id: &str, url: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.load().await?;
        match table.position(channel_id, url) {
            Some(idx) => {
                table.subscriptions.remove(idx);
                self.save(&table).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// All subscriptions for one channel, for the `list` command.
    pub async fn list_for_channel(&self, channel_id: &str) -> Result<Vec<Subscription>> {
        let table = self.load().await?;
        Ok(table
            .subscriptions
            .into_iter()
            .filter(|s| s.channel_id == channel_id)
            .collect())
    }

    /// Every subscription, for the heartbeat pass.
    pub async fn list_all(&self) -> Result<Vec<Subscription>> {
        Ok(self.load().await?.subscriptions)
    }

    /// Replace the stored snapshot of a subscription. A no-op if the
    /// subscription was concurrently removed.
    pub async fn update_snapshot(&self, channel_id: &str, url: &str, snapshot: &[u8]) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.load().await?;
        if let Some(idx) = table.position(channel_id, url) {
            table.subscriptions[idx].snapshot = snapshot.to_vec();
            self.save(&table).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_store() -> SubscriptionStore {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        SubscriptionStore::new(db)
    }

    #[tokio::test]
    async fn test_subscribe_creates_empty_snapshot() {
        let store = setup_store().await;

        let created = store
            .subscribe("town-square", "https://example.com/feed.xml")
            .await
            .unwrap();
        assert!(created);

        let subs = store.list_all().await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].channel_id, "town-square");
        assert_eq!(subs[0].url, "https://example.com/feed.xml");
        assert!(subs[0].snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_twice_is_noop() {
        let store = setup_store().await;
        store.subscribe("ch", "https://a.example/feed").await.unwrap();
        store
            .update_snapshot("ch", "https://a.example/feed", b"<rss/>")
            .await
            .unwrap();

        let created = store.subscribe("ch", "https://a.example/feed").await.unwrap();
        assert!(!created);

        // The existing snapshot is preserved, not reset.
        let subs = store.list_all().await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].snapshot, b"<rss/>");
    }

    #[tokio::test]
    async fn test_same_url_different_channels() {
        let store = setup_store().await;
        assert!(store.subscribe("ch1", "https://a.example/feed").await.unwrap());
        assert!(store.subscribe("ch2", "https://a.example/feed").await.unwrap());

        assert_eq!(store.list_all().await.unwrap().len(), 2);
        assert_eq!(store.list_for_channel("ch1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_removes() {
        let store = setup_store().await;
        store.subscribe("ch", "https://a.example/feed").await.unwrap();

        let removed = store.unsubscribe("ch", "https://a.example/feed").await.unwrap();
        assert!(removed);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsubscribe_missing_is_noop() {
        let store = setup_store().await;

        let removed = store.unsubscribe("ch", "https://a.example/feed").await.unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_unsubscribe_requires_exact_url() {
        let store = setup_store().await;
        store.subscribe("ch", "https://a.example/feed").await.unwrap();

        let removed = store.unsubscribe("ch", "https://a.example/feed/").await.unwrap();
        assert!(!removed);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_for_channel_filters() {
        let store = setup_store().await;
        store.subscribe("ch1", "https://a.example/feed").await.unwrap();
        store.subscribe("ch1", "https://b.example/feed").await.unwrap();
        store.subscribe("ch2", "https://c.example/feed").await.unwrap();

        let subs = store.list_for_channel("ch1").await.unwrap();
        assert_eq!(subs.len(), 2);
        assert!(subs.iter().all(|s| s.channel_id == "ch1"));
    }

    #[tokio::test]
    async fn test_update_snapshot() {
        let store = setup_store().await;
        store.subscribe("ch", "https://a.example/feed").await.unwrap();

        store
            .update_snapshot("ch", "https://a.example/feed", b"<rss>payload</rss>")
            .await
            .unwrap();

        let subs = store.list_all().await.unwrap();
        assert_eq!(subs[0].snapshot, b"<rss>payload</rss>");
    }

    #[tokio::test]
    async fn test_snapshot_round_trips_non_utf8_bytes() {
        let store = setup_store().await;
        store.subscribe("ch", "https://a.example/feed").await.unwrap();

        // An ISO-8859-1 payload: 0xE9 is not valid UTF-8 on its own.
        let payload: Vec<u8> = [b"<rss><title>Caf".as_slice(), &[0xE9], b"</title></rss>"].concat();
        assert!(std::str::from_utf8(&payload).is_err());

        store
            .update_snapshot("ch", "https://a.example/feed", &payload)
            .await
            .unwrap();

        let subs = store.list_all().await.unwrap();
        assert_eq!(subs[0].snapshot, payload);
    }

    #[tokio::test]
    async fn test_update_snapshot_after_removal_is_noop() {
        let store = setup_store().await;

        store
            .update_snapshot("ch", "https://a.example/feed", b"<rss/>")
            .await
            .unwrap();

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_table_surfaces_error() {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        db.kv_set(SUBSCRIPTIONS_KEY, b"{not json").await.unwrap();
        let store = SubscriptionStore::new(db);

        let result = store.list_all().await;
        assert!(matches!(result, Err(FeedbeatError::StorageCorrupt(_))));

        // Corruption must not be silently overwritten by a fresh table.
        let result = store.subscribe("ch", "https://a.example/feed").await;
        assert!(matches!(result, Err(FeedbeatError::StorageCorrupt(_))));
    }

    #[tokio::test]
    async fn test_table_persists_across_store_instances() {
        let db = Arc::new(Database::open_in_memory().await.unwrap());

        let store = SubscriptionStore::new(db.clone());
        store.subscribe("ch", "https://a.example/feed").await.unwrap();
        drop(store);

        let store = SubscriptionStore::new(db);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }
}
