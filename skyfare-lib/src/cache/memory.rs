//! Process-local cache provider

use async_trait::async_trait;
use dashmap::DashMap;

use super::CacheEntry;
use super::CacheProvider;

/// Cache held in a [`DashMap`]. Entries last until the process exits.
///
/// Expired entries are evicted when read or by [`CacheProvider::purge_expired`].
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheProvider for InMemoryCache {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        // remove_if holds the shard lock, so a concurrent put is never evicted.
        if self.entries.remove_if(key, |_, e| e.is_expired()).is_some() {
            return None;
        }
        self.entries.get(key).map(|e| e.value().clone())
    }

    async fn put(&self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    async fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    async fn remove_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before.saturating_sub(self.entries.len())
    }

    async fn clear(&self) {
        self.entries.clear();
    }

    async fn purge_expired(&self) -> usize {
        let mut purged = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired();
            purged += usize::from(!keep);
            keep
        });
        purged
    }
}
