//! In-memory read-through caches for guild prefixes and roster snapshots.

use crate::{
    core::roster::{Roster, RosterChanged, RosterSink},
    errors::Result,
};
use async_trait::async_trait;
use std::{collections::HashMap, future::Future, hash::Hash};
use tokio::sync::RwLock;
use tracing::trace;

/// A map that falls back to a fetch function on a miss and remembers the result.
#[derive(Debug)]
pub struct ReadThroughCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for ReadThroughCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> ReadThroughCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value, or runs `fetch`, stores its value, and returns it.
    ///
    /// A failed fetch is returned as-is and nothing is cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.entries.read().await.get(&key) {
            trace!(?key, "Cache hit");
            return Ok(value.clone());
        }

        trace!(?key, "Cache miss");
        let value = fetch().await?;
        self.entries.write().await.insert(key, value.clone());
        Ok(value)
    }

    /// Returns the cached value without fetching.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    /// Stores or replaces a value.
    pub async fn insert(&self, key: K, value: V) {
        self.entries.write().await.insert(key, value);
    }

    /// Drops a value so the next lookup fetches it again.
    pub async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Latest roster snapshot per user, kept fresh by [`RosterChanged`] events.
pub type RosterCache = ReadThroughCache<u64, Roster>;

#[async_trait]
impl RosterSink for RosterCache {
    async fn roster_changed(&self, event: RosterChanged) {
        self.insert(event.user_id, event.snapshot).await;
    }
}
