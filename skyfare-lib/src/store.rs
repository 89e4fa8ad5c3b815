//! Query result persistence
//!
//! [`QueryStore`] keeps search results in a [`CacheProvider`] so a search
//! made earlier is rehydrated without another API call, and merges rows
//! saved from the results table back into the cached result.
//!
//! # Example
//!
//! ```ignore
//! use skyfare_lib::cache::{CacheConfig, SqliteCache};
//! use skyfare_lib::store::QueryStore;
//! use skyfare_lib::table::{SaveCoordinator, TableState};
//!
//! let store = QueryStore::new(client, SqliteCache::open("cache.db").await?, CacheConfig::default());
//! let result = store.flight_inspiration(&query).await?.into_inner();
//!
//! let mut table = TableState::new(FlightDestination::columns());
//! table.ingest(result.to_rows());
//! table.update_cell(&id, "price", "120.00");
//!
//! SaveCoordinator::default().save(&mut table, &store.flight_sink(&query)).await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::AmadeusClient;
use crate::api::FLIGHT_KEY_PREFIX;
use crate::api::FlightInspirationQuery;
use crate::api::LocationQuery;
use crate::cache::CacheConfig;
use crate::cache::CacheProvider;
use crate::cache::CacheEntry;
use crate::error::Error;
use crate::model::FlightDestination;
use crate::model::FlightDestinations;
use crate::model::Locations;
use crate::model::Row;
use crate::model::RowId;
use crate::response::SearchResponse;
use crate::table::RowSink;
use crate::table::SinkError;

/// Cached access to Amadeus search results.
///
/// Cheap to clone; clones share the client and the cache.
#[derive(Clone)]
pub struct QueryStore {
    client: AmadeusClient,
    cache: Arc<dyn CacheProvider>,
    config: CacheConfig,
}

impl QueryStore {
    /// Creates a store over `cache`.
    pub fn new(client: AmadeusClient, cache: impl CacheProvider + 'static, config: CacheConfig) -> Self {
        Self {
            client,
            cache: Arc::new(cache),
            config,
        }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &AmadeusClient {
        &self.client
    }

    // =========================================================================
    // Flights
    // =========================================================================

    /// Returns the flight result for `query`, from cache when present.
    pub async fn flight_inspiration(
        &self,
        query: &FlightInspirationQuery,
    ) -> Result<SearchResponse<FlightDestinations>, Error> {
        let key = query.cache_key();
        if let Some(cached) = self.load(&key).await {
            debug!("Cache hit for {}", key);
            return Ok(cached);
        }

        let result = self.client.flight_inspiration(query).await?;
        self.store(&key, result, self.config.flight_ttl).await
    }

    /// Returns the cached flight result for `query`, if any.
    pub async fn cached_flights(
        &self,
        query: &FlightInspirationQuery,
    ) -> Option<SearchResponse<FlightDestinations>> {
        self.load(&query.cache_key()).await
    }

    /// Stores a flight result for `query`, replacing any cached one.
    pub async fn put_flights(
        &self,
        query: &FlightInspirationQuery,
        result: FlightDestinations,
    ) -> Result<SearchResponse<FlightDestinations>, Error> {
        self.store(&query.cache_key(), result.assign_ids(), self.config.flight_ttl)
            .await
    }

    /// Merges saved entries into the cached result of `query`.
    ///
    /// Entries replace cached entries with the same row id. Returns the ids
    /// that matched no cached entry. Fails if nothing is cached for `query`.
    pub async fn merge_flights(
        &self,
        query: &FlightInspirationQuery,
        updated: &[FlightDestination],
    ) -> Result<Vec<RowId>, Error> {
        let key = query.cache_key();
        let Some(cached) = self.load::<FlightDestinations>(&key).await else {
            return Err(Error::Cache(format!("No cached result for {}", key)));
        };
        let expires_at = cached.expires_at();
        let mut result = cached.into_inner();

        let unmatched = updated
            .iter()
            .filter(|u| !result.data.iter().any(|e| e.row_id() == u.row_id()))
            .map(|u| RowId::new(u.row_id()))
            .collect();
        let replaced = result.merge(updated);
        debug!("Merged {} saved rows into {}", replaced, key);

        // Saving keeps the cached expiry.
        let ttl = expires_at
            .and_then(|exp| (exp - chrono::Utc::now()).to_std().ok())
            .unwrap_or(self.config.flight_ttl);
        self.store(&key, result, ttl).await?;
        Ok(unmatched)
    }

    /// Returns a row sink that merges saved rows into the cached result of
    /// `query`.
    pub fn flight_sink(&self, query: &FlightInspirationQuery) -> FlightResultSink {
        FlightResultSink {
            store: self.clone(),
            query: query.clone(),
        }
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// Returns the location result for `query`, from cache when present.
    pub async fn search_locations(&self, query: &LocationQuery) -> Result<SearchResponse<Locations>, Error> {
        let key = query.cache_key();
        if let Some(cached) = self.load(&key).await {
            debug!("Cache hit for {}", key);
            return Ok(cached);
        }

        let result = self.client.search_locations(query).await?;
        self.store(&key, result, self.config.location_ttl).await
    }

    // =========================================================================
    // Cache access
    // =========================================================================

    /// Drops the cached result of a flight query.
    pub async fn invalidate_flights(&self, query: &FlightInspirationQuery) {
        self.cache.remove(&query.cache_key()).await;
    }

    /// Drops every cached flight result, keeping location lookups. Returns
    /// the number of results dropped.
    pub async fn invalidate_all_flights(&self) -> usize {
        self.cache.remove_prefix(FLIGHT_KEY_PREFIX).await
    }

    /// Drops every cached result.
    pub async fn clear(&self) {
        self.cache.clear().await;
    }

    /// Removes expired results. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<SearchResponse<T>> {
        let entry = self.cache.get(key).await?;
        match bincode::deserialize::<T>(&entry.payload) {
            Ok(result) => Some(SearchResponse::rehydrated(result, &entry)),
            Err(e) => {
                debug!("Dropping undecodable cache entry {}: {}", key, e);
                self.cache.remove(key).await;
                None
            }
        }
    }

    async fn store<T: Serialize>(
        &self,
        key: &str,
        result: T,
        ttl: Duration,
    ) -> Result<SearchResponse<T>, Error> {
        if ttl.is_zero() {
            return Ok(SearchResponse::uncached(result));
        }

        let entry = CacheEntry::expiring_in(bincode::serialize(&result)?, ttl);
        let response = SearchResponse::stored(result, &entry);
        self.cache.put(key, entry).await;
        Ok(response)
    }
}

/// A [`RowSink`] that writes saved flight rows into a cached result.
///
/// Rows that do not convert back into a [`FlightDestination`] or match no
/// cached entry are reported as failed; the others are merged.
#[derive(Clone)]
pub struct FlightResultSink {
    store: QueryStore,
    query: FlightInspirationQuery,
}

#[async_trait]
impl RowSink for FlightResultSink {
    async fn write_rows(&self, rows: Vec<Row>) -> Result<(), SinkError> {
        let mut failed = Vec::new();
        let mut updated = Vec::with_capacity(rows.len());

        for row in &rows {
            match FlightDestination::try_from(row) {
                Ok(entry) => updated.push(entry),
                Err(e) => {
                    debug!("Row {} is not a flight destination: {}", row.id(), e);
                    failed.push(row.id().clone());
                }
            }
        }

        let unmatched = self
            .store
            .merge_flights(&self.query, &updated)
            .await
            .map_err(|e| SinkError::Batch(e.to_string()))?;
        failed.extend(unmatched);

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SinkError::Partial {
                message: format!("{} rows could not be merged", failed.len()),
                failed,
            })
        }
    }
}
