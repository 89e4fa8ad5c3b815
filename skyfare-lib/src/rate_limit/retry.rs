//! Retry configuration for automatic request retry.

use std::time::Duration;

/// Configuration for automatic retry behavior.
///
/// Amadeus answers bursts above its per-second quota with HTTP 429 and
/// occasionally fails with 5xx; both are retried with exponential backoff.
/// A `Retry-After` header on a 429 overrides the computed delay.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use skyfare_lib::rate_limit::RetryConfig;
///
/// let custom = RetryConfig::default()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(500));
///
/// assert_eq!(custom.next_delay(Duration::from_millis(500)), Duration::from_secs(1));
/// assert_eq!(RetryConfig::no_retry().max_retries, 0);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Initial delay between retries (doubles each attempt).
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Whether to retry on HTTP 429 (rate limited).
    pub retry_on_429: bool,
    /// Whether to retry on HTTP 5xx (server errors).
    pub retry_on_5xx: bool,
    /// Whether to retry on network errors.
    pub retry_on_network: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            retry_on_429: true,
            retry_on_5xx: true,
            retry_on_network: true,
        }
    }
}

impl RetryConfig {
    /// Creates a config with all retries disabled.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            retry_on_429: false,
            retry_on_5xx: false,
            retry_on_network: false,
            ..Default::default()
        }
    }

    /// Sets the maximum number of retries.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Sets the initial delay between retries.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Returns the delay following `delay`: doubled, capped at `max_delay`.
    pub fn next_delay(&self, delay: Duration) -> Duration {
        (delay * 2).min(self.max_delay)
    }

    /// Returns `true` if a response with `status` should be retried after
    /// `attempts` retries.
    pub fn should_retry_status(&self, status: u16, attempts: u32) -> bool {
        if attempts >= self.max_retries {
            return false;
        }
        match status {
            429 => self.retry_on_429,
            500..=599 => self.retry_on_5xx,
            _ => false,
        }
    }

    /// Returns `true` if a network failure should be retried after
    /// `attempts` retries.
    pub fn should_retry_network(&self, attempts: u32) -> bool {
        self.retry_on_network && attempts < self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_delay_is_capped() {
        let config = RetryConfig::default().max_delay(Duration::from_secs(5));
        assert_eq!(config.next_delay(Duration::from_secs(2)), Duration::from_secs(4));
        assert_eq!(config.next_delay(Duration::from_secs(4)), Duration::from_secs(5));
    }

    #[test]
    fn test_should_retry_status() {
        let config = RetryConfig::default();
        assert!(config.should_retry_status(429, 0));
        assert!(config.should_retry_status(503, 2));
        assert!(!config.should_retry_status(503, 3));
        assert!(!config.should_retry_status(400, 0));

        let none = RetryConfig::no_retry();
        assert!(!none.should_retry_status(429, 0));
        assert!(!none.should_retry_network(0));
    }
}
