//! Cache configuration

use std::time::Duration;

/// Configuration for cache TTL (time-to-live) settings.
///
/// Search results are kept for the whole session by default: a result
/// fetched once is served from cache until it expires or is cleared.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use skyfare_lib::cache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_flight_ttl(Duration::from_secs(600))
///     .with_location_ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for flight inspiration results.
    ///
    /// Default: 24 hours
    pub flight_ttl: Duration,

    /// TTL for airport and city lookups.
    ///
    /// Default: 24 hours
    pub location_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            flight_ttl: Duration::from_secs(24 * 3600),
            location_ttl: Duration::from_secs(24 * 3600),
        }
    }
}

impl CacheConfig {
    /// Creates a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flight result TTL.
    pub fn with_flight_ttl(mut self, ttl: Duration) -> Self {
        self.flight_ttl = ttl;
        self
    }

    /// Sets the location result TTL.
    pub fn with_location_ttl(mut self, ttl: Duration) -> Self {
        self.location_ttl = ttl;
        self
    }

    /// Creates a config with no caching (zero TTLs).
    pub fn no_cache() -> Self {
        Self {
            flight_ttl: Duration::ZERO,
            location_ttl: Duration::ZERO,
        }
    }
}
