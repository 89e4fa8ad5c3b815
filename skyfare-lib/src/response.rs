//! Search results tagged with where they came from

use std::ops::Deref;

use chrono::DateTime;
use chrono::Utc;

use crate::cache::CacheEntry;

/// Where a [`SearchResponse`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Fetched from Amadeus; caching is disabled for this kind of query.
    Uncached,
    /// Fetched from Amadeus and stored in the cache.
    Stored {
        stored_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },
    /// Read back from the cache without an API call.
    Rehydrated {
        stored_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },
}

impl CacheStatus {
    pub fn is_uncached(&self) -> bool {
        matches!(self, Self::Uncached)
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }

    pub fn is_rehydrated(&self) -> bool {
        matches!(self, Self::Rehydrated { .. })
    }

    fn lifetime(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match *self {
            Self::Uncached => None,
            Self::Stored {
                stored_at,
                expires_at,
            }
            | Self::Rehydrated {
                stored_at,
                expires_at,
            } => Some((stored_at, expires_at)),
        }
    }
}

/// A search result returned by [`QueryStore`](crate::store::QueryStore).
///
/// Derefs to the result, so `response.data` reaches the entries directly.
///
/// ```ignore
/// let response = store.flight_inspiration(&query).await?;
/// if response.is_rehydrated() {
///     info!("Showing results from {:?}", response.stored_at());
/// }
/// table.ingest(response.to_rows());
/// ```
#[derive(Debug, Clone)]
pub struct SearchResponse<T> {
    result: T,
    pub status: CacheStatus,
}

impl<T> SearchResponse<T> {
    pub fn uncached(result: T) -> Self {
        Self {
            result,
            status: CacheStatus::Uncached,
        }
    }

    /// A fresh result written to the cache as `entry`.
    pub fn stored(result: T, entry: &CacheEntry) -> Self {
        Self {
            result,
            status: CacheStatus::Stored {
                stored_at: entry.stored_at,
                expires_at: entry.expires_at,
            },
        }
    }

    /// A result decoded from the cached `entry`.
    pub fn rehydrated(result: T, entry: &CacheEntry) -> Self {
        Self {
            result,
            status: CacheStatus::Rehydrated {
                stored_at: entry.stored_at,
                expires_at: entry.expires_at,
            },
        }
    }

    pub fn is_rehydrated(&self) -> bool {
        self.status.is_rehydrated()
    }

    /// Returns `true` if the result came from Amadeus on this call.
    pub fn is_fresh(&self) -> bool {
        !self.is_rehydrated()
    }

    pub fn stored_at(&self) -> Option<DateTime<Utc>> {
        self.status.lifetime().map(|(stored_at, _)| stored_at)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.status.lifetime().map(|(_, expires_at)| expires_at)
    }

    /// How long ago the result was fetched from Amadeus, if it was cached.
    pub fn age(&self) -> Option<chrono::Duration> {
        self.stored_at().map(|at| Utc::now() - at)
    }

    pub fn result(&self) -> &T {
        &self.result
    }

    pub fn into_inner(self) -> T {
        self.result
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SearchResponse<U> {
        SearchResponse {
            result: f(self.result),
            status: self.status,
        }
    }
}

impl<T> Deref for SearchResponse<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.result
    }
}
