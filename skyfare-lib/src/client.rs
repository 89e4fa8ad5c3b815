//! Main AmadeusClient

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use log::warn;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::AutoRefreshTokenProvider;
use crate::auth::ClientCredentialsFlow;
use crate::auth::TokenProvider;
use crate::error::ApiError;
use crate::error::Error;
use crate::rate_limit::RetryConfig;

/// Default Amadeus API base URL (the self-service test environment).
pub const DEFAULT_BASE_URL: &str = "https://test.api.amadeus.com";

/// The client for the Amadeus self-service APIs.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks safely.
///
/// # Example
///
/// ```ignore
/// use skyfare_lib::{AmadeusClient, auth::StaticTokenProvider};
///
/// let client = AmadeusClient::builder()
///     .token_provider(StaticTokenProvider::new("my-token"))
///     .build()?;
///
/// let destinations = client.flight_inspiration(&query).await?;
/// ```
#[derive(Clone)]
pub struct AmadeusClient {
    inner: Arc<AmadeusClientInner>,
}

struct AmadeusClientInner {
    base_url: Url,
    token_provider: Arc<dyn TokenProvider>,
    http_client: Client,
    timeout: Option<Duration>,
    retry_config: RetryConfig,
}

impl AmadeusClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> AmadeusClientBuilder<Missing> {
        AmadeusClientBuilder::new()
    }

    /// Creates a client that authenticates with the client credentials
    /// flow and caches its token.
    pub fn with_credentials(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        let flow = ClientCredentialsFlow::new(base_url, client_id, client_secret);
        Self::builder()
            .base_url(base_url)
            .token_provider(AutoRefreshTokenProvider::new(flow))
            .build()
    }

    /// Returns the base URL of the API.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the token provider used by this client.
    pub fn token_provider(&self) -> &Arc<dyn TokenProvider> {
        &self.inner.token_provider
    }

    /// Builds an endpoint URL from a path and query parameters.
    pub(crate) fn build_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, Error> {
        let mut url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Sends an authenticated GET request and decodes the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.build_url(path, params)?;
        let response = self.request(&url).await?;
        let body = response.text().await.map_err(ApiError::from)?;

        serde_json::from_str(&body).map_err(|e| {
            Error::Api(ApiError::parse_with_body(
                format!("Failed to decode {}: {}", path, e),
                body,
            ))
        })
    }

    /// Makes a GET request with retry logic.
    ///
    /// Non-success responses are turned into [`ApiError::Http`] carrying the
    /// first Amadeus error detail.
    async fn request(&self, url: &Url) -> Result<reqwest::Response, Error> {
        let retry_config = &self.inner.retry_config;
        let mut attempts = 0;
        let mut delay = retry_config.initial_delay;

        loop {
            match self.send_request_inner(url).await {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if status == 429 {
                        let retry_after = parse_retry_after(&response);
                        if !retry_config.should_retry_status(status, attempts) {
                            return Err(Error::RateLimit { retry_after });
                        }

                        let wait = retry_after.unwrap_or(delay);
                        warn!("Rate limited on {}, retrying in {:?}", url.path(), wait);
                        tokio::time::sleep(wait).await;
                        attempts += 1;
                        continue;
                    }

                    if response.status().is_server_error()
                        && retry_config.should_retry_status(status, attempts)
                    {
                        warn!(
                            "HTTP {} from {}, retrying in {:?}",
                            status,
                            url.path(),
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        delay = retry_config.next_delay(delay);
                        attempts += 1;
                        continue;
                    }

                    if response.status().is_success() {
                        return Ok(response);
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Api(ApiError::from_response(status, body)));
                }
                Err(Error::Api(ApiError::Network(e)))
                    if retry_config.should_retry_network(attempts) =>
                {
                    warn!("Network error on {}: {}, retrying in {:?}", url.path(), e, delay);
                    tokio::time::sleep(delay).await;
                    delay = retry_config.next_delay(delay);
                    attempts += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Inner request method without retry logic.
    async fn send_request_inner(&self, url: &Url) -> Result<reqwest::Response, Error> {
        let token = self.inner.token_provider.get_token().await?;
        debug!("GET {}", url);

        let mut request = self
            .inner
            .http_client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(&token.access_token);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        request.send().await.map_err(|e| match self.inner.timeout {
            Some(timeout) if e.is_timeout() => Error::Api(ApiError::Timeout(timeout)),
            _ => Error::Api(ApiError::from(e)),
        })
    }
}

/// Parses the Retry-After header value (seconds).
fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`AmadeusClient`].
///
/// Uses the typestate pattern to ensure the token provider is set at
/// compile time. The base URL defaults to [`DEFAULT_BASE_URL`].
///
/// # Example
///
/// ```ignore
/// let client = AmadeusClient::builder()
///     .base_url("https://api.amadeus.com")
///     .token_provider(my_provider)
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct AmadeusClientBuilder<Provider> {
    base_url: String,
    token_provider: Provider,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    retry_config: RetryConfig,
}

impl AmadeusClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_provider: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            retry_config: RetryConfig::default(),
        }
    }

    /// Sets the token provider for authentication.
    pub fn token_provider<T: TokenProvider + 'static>(
        self,
        provider: T,
    ) -> AmadeusClientBuilder<Set<Arc<dyn TokenProvider>>> {
        self.shared_token_provider(Arc::new(provider))
    }

    /// Sets a token provider shared with other components.
    pub fn shared_token_provider(
        self,
        provider: Arc<dyn TokenProvider>,
    ) -> AmadeusClientBuilder<Set<Arc<dyn TokenProvider>>> {
        AmadeusClientBuilder {
            base_url: self.base_url,
            token_provider: Set(provider),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            retry_config: self.retry_config,
        }
    }
}

impl Default for AmadeusClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> AmadeusClientBuilder<P> {
    /// Sets the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the retry behavior.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }
}

impl AmadeusClientBuilder<Set<Arc<dyn TokenProvider>>> {
    /// Builds the [`AmadeusClient`].
    ///
    /// Fails if the base URL does not parse or the HTTP client cannot be
    /// created.
    pub fn build(self) -> Result<AmadeusClient, Error> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::from)?
            }
        };

        Ok(AmadeusClient {
            inner: Arc::new(AmadeusClientInner {
                base_url,
                token_provider: self.token_provider.0,
                http_client,
                timeout: self.timeout,
                retry_config: self.retry_config,
            }),
        })
    }
}
