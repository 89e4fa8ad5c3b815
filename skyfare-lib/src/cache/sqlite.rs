//! Persistent cache provider on SQLite

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_sqlite::rusqlite::OptionalExtension;
use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use log::warn;

use super::CacheEntry;
use super::CacheProvider;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS search_cache (
        key TEXT PRIMARY KEY,
        payload BLOB NOT NULL,
        stored_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_search_cache_expires_at ON search_cache(expires_at);
";

/// Cache kept in a SQLite database, so searches from an earlier session are
/// rehydrated without another Amadeus call.
///
/// Timestamps are stored as unix seconds. File databases use WAL journaling.
///
/// ```ignore
/// let cache = SqliteCache::open("skyfare-cache.db").await?;
/// let store = QueryStore::new(client, cache, CacheConfig::default());
/// ```
pub struct SqliteCache {
    client: Client,
}

impl SqliteCache {
    /// Opens (or creates) the cache database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, async_sqlite::Error> {
        Self::connect(ClientBuilder::new().path(path).journal_mode(JournalMode::Wal)).await
    }

    /// Opens a private in-memory database.
    pub async fn open_in_memory() -> Result<Self, async_sqlite::Error> {
        Self::connect(ClientBuilder::new().path(":memory:")).await
    }

    async fn connect(builder: ClientBuilder) -> Result<Self, async_sqlite::Error> {
        let client = builder.open().await?;
        client.conn(|conn| conn.execute_batch(SCHEMA)).await?;
        Ok(Self { client })
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> Result<usize, async_sqlite::Error> {
        self.client
            .conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM search_cache", [], |row| row.get::<_, i64>(0))
            })
            .await
            .map(|count| count.max(0) as usize)
    }

    pub async fn is_empty(&self) -> Result<bool, async_sqlite::Error> {
        Ok(self.len().await? == 0)
    }

    /// Runs a delete statement, logging failures as zero rows removed.
    async fn delete(&self, what: &str, sql: &'static str, param: rusqlite::types::Value) -> usize {
        match self
            .client
            .conn(move |conn| conn.execute(sql, [param]))
            .await
        {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Failed to remove {} from search cache: {}", what, e);
                0
            }
        }
    }
}

fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

#[async_trait]
impl CacheProvider for SqliteCache {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let key = key.to_string();
        let now = Utc::now().timestamp();

        let row = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT payload, stored_at, expires_at FROM search_cache
                     WHERE key = ?1 AND expires_at > ?2",
                    rusqlite::params![key, now],
                    |row| {
                        Ok((
                            row.get::<_, Vec<u8>>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                )
                .optional()
            })
            .await;

        match row {
            Ok(Some((payload, stored_at, expires_at))) => Some(CacheEntry::new(
                payload,
                from_unix(stored_at)?,
                from_unix(expires_at)?,
            )),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read search cache: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &str, entry: CacheEntry) {
        let key = key.to_string();
        let CacheEntry {
            payload,
            stored_at,
            expires_at,
        } = entry;

        let result = self
            .client
            .conn(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO search_cache (key, payload, stored_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![key, payload, stored_at.timestamp(), expires_at.timestamp()],
                )
            })
            .await;

        if let Err(e) = result {
            warn!("Failed to write search cache entry: {}", e);
        }
    }

    async fn remove(&self, key: &str) {
        self.delete(
            key,
            "DELETE FROM search_cache WHERE key = ?1",
            key.to_string().into(),
        )
        .await;
    }

    async fn remove_prefix(&self, prefix: &str) -> usize {
        self.delete(
            prefix,
            "DELETE FROM search_cache WHERE substr(key, 1, length(?1)) = ?1",
            prefix.to_string().into(),
        )
        .await
    }

    async fn clear(&self) {
        if let Err(e) = self
            .client
            .conn(|conn| conn.execute("DELETE FROM search_cache", []))
            .await
        {
            warn!("Failed to clear search cache: {}", e);
        }
    }

    async fn purge_expired(&self) -> usize {
        self.delete(
            "expired entries",
            "DELETE FROM search_cache WHERE expires_at <= ?1",
            Utc::now().timestamp().into(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_entries_and_expiry() {
        let cache = SqliteCache::open_in_memory().await.unwrap();
        cache
            .put("location:par", CacheEntry::expiring_in(b"paris".to_vec(), Duration::from_secs(60)))
            .await;

        let past = Utc::now() - chrono::Duration::seconds(10);
        cache
            .put("location:old", CacheEntry::new(b"old".to_vec(), past, past))
            .await;

        assert_eq!(cache.get("location:par").await.unwrap().payload, b"paris");
        assert!(cache.get("location:old").await.is_none());
        assert_eq!(cache.len().await.unwrap(), 2);

        assert_eq!(cache.purge_expired().await, 1);
        cache.clear().await;
        assert!(cache.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_prefix_leaves_other_keys() {
        let cache = SqliteCache::open_in_memory().await.unwrap();
        for key in ["flight:PAR:2026-11-01", "flight:NYC:2026-11-01", "location:flight"] {
            cache
                .put(key, CacheEntry::expiring_in(vec![0], Duration::from_secs(60)))
                .await;
        }

        assert_eq!(cache.remove_prefix("flight:").await, 2);
        assert!(cache.get("location:flight").await.is_some());
    }
}
