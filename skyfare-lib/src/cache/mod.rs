//! TTL cache for search results
//!
//! Entries are opaque byte payloads (bincode-encoded models) keyed by a
//! query's cache key, e.g. `flight:PAR:2026-11-01`. The
//! [`QueryStore`](crate::store::QueryStore) decides what goes in; providers
//! only store bytes and enforce expiry.

mod config;
mod memory;
mod sqlite;

pub use config::*;
pub use memory::*;
pub use sqlite::*;

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

/// One stored payload and its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub payload: Vec<u8>,
    pub stored_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(payload: Vec<u8>, stored_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            stored_at,
            expires_at,
        }
    }

    /// Creates an entry stored now that lives for `ttl`.
    pub fn expiring_in(payload: Vec<u8>, ttl: Duration) -> Self {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            payload,
            stored_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Time left before expiry; `None` once expired.
    pub fn remaining(&self) -> Option<Duration> {
        (self.expires_at - Utc::now()).to_std().ok().filter(|d| !d.is_zero())
    }
}

/// Storage backend of the result cache.
///
/// `get` never returns an expired entry. Write failures are logged by the
/// provider and otherwise ignored: a cache that cannot be written only costs
/// another API call.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Returns the live entry under `key`.
    async fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Stores `entry` under `key`, replacing any previous entry.
    async fn put(&self, key: &str, entry: CacheEntry);

    async fn remove(&self, key: &str);

    /// Removes every entry whose key starts with `prefix`. Returns the
    /// number removed.
    async fn remove_prefix(&self, prefix: &str) -> usize;

    async fn clear(&self);

    /// Removes expired entries. Returns the number removed.
    async fn purge_expired(&self) -> usize;
}
