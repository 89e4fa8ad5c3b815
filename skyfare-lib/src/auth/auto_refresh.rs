//! Automatic token refresh handling.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::sync::RwLock;

use super::AccessToken;
use super::TokenProvider;
use crate::error::AuthError;

/// Default time before expiry at which a cached token is replaced.
pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::from_secs(300);

/// Trait for authentication flows that can obtain a fresh token.
///
/// Used with [`AutoRefreshTokenProvider`] for automatic token management.
#[async_trait]
pub trait AuthFlow: Send + Sync {
    /// Authenticates and obtains a new access token.
    async fn authenticate(&self) -> Result<AccessToken, AuthError>;
}

/// A token provider that caches tokens and fetches new ones before they
/// expire.
///
/// Wraps any [`AuthFlow`] implementation:
/// - Returns the cached token while it is valid beyond the refresh buffer
/// - Re-authenticates once the token is inside the buffer
/// - Lets concurrent callers share one authentication
///
/// # Example
///
/// ```ignore
/// use skyfare_lib::auth::{AutoRefreshTokenProvider, ClientCredentialsFlow};
/// use skyfare_lib::AmadeusClient;
///
/// let flow = ClientCredentialsFlow::new(base_url, client_id, client_secret);
/// let client = AmadeusClient::builder()
///     .token_provider(AutoRefreshTokenProvider::new(flow))
///     .build()?;
/// ```
pub struct AutoRefreshTokenProvider<F> {
    flow: F,
    token: RwLock<Option<AccessToken>>,
    /// Refresh this long before actual expiry
    refresh_buffer: Duration,
}

impl<F: AuthFlow> AutoRefreshTokenProvider<F> {
    /// Creates a new auto-refresh token provider.
    ///
    /// Tokens are replaced 5 minutes before they expire.
    pub fn new(flow: F) -> Self {
        Self::with_refresh_buffer(flow, DEFAULT_REFRESH_BUFFER)
    }

    /// Creates a new auto-refresh token provider with a custom refresh buffer.
    pub fn with_refresh_buffer(flow: F, refresh_buffer: Duration) -> Self {
        Self {
            flow,
            token: RwLock::new(None),
            refresh_buffer,
        }
    }

    /// Clears the cached token, forcing re-authentication on next request.
    pub async fn clear_token(&self) {
        let mut token = self.token.write().await;
        *token = None;
    }

    /// Returns the wrapped flow.
    pub fn flow(&self) -> &F {
        &self.flow
    }

    fn is_fresh(&self, token: &AccessToken) -> bool {
        let buffer =
            chrono::Duration::from_std(self.refresh_buffer).unwrap_or(chrono::Duration::zero());
        !token.expires_within(buffer)
    }
}

#[async_trait]
impl<F: AuthFlow> TokenProvider for AutoRefreshTokenProvider<F> {
    async fn get_token(&self) -> Result<AccessToken, AuthError> {
        // Fast path: check if we have a valid cached token
        {
            let token_guard = self.token.read().await;
            if let Some(ref token) = *token_guard
                && self.is_fresh(token)
            {
                return Ok(token.clone());
            }
        }

        // Slow path: need to authenticate
        let mut token_guard = self.token.write().await;

        // Double-check after acquiring write lock (another task may have refreshed)
        if let Some(ref token) = *token_guard
            && self.is_fresh(token)
        {
            return Ok(token.clone());
        }

        debug!("Cached token missing or expiring, authenticating");
        let new_token = self.flow.authenticate().await?;
        *token_guard = Some(new_token.clone());
        Ok(new_token)
    }
}
