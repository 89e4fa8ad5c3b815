//! OAuth2 client credentials flow

use async_trait::async_trait;
use log::info;

use super::AccessToken;
use super::auto_refresh::AuthFlow;
use super::common::handle_token_response;
use super::common::token_url;
use crate::error::AuthError;

/// OAuth2 client credentials flow against the Amadeus token endpoint.
///
/// Posts `grant_type=client_credentials` with the API key and secret as a
/// form body. Amadeus issues no refresh tokens, so wrap the flow in an
/// [`AutoRefreshTokenProvider`](super::AutoRefreshTokenProvider) to reuse
/// tokens until they near expiry.
///
/// # Example
///
/// ```ignore
/// use skyfare_lib::auth::{AuthFlow, ClientCredentialsFlow};
///
/// let flow = ClientCredentialsFlow::new(
///     "https://test.api.amadeus.com",
///     "your-api-key",
///     "your-api-secret",
/// );
/// let token = flow.authenticate().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ClientCredentialsFlow {
    token_url: String,
    client_id: String,
    client_secret: String,
    http_client: reqwest::Client,
}

impl ClientCredentialsFlow {
    /// Creates a new flow for the API at `base_url`.
    pub fn new(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url(base_url),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Creates a flow from optional credentials, failing if either is unset
    /// or empty.
    pub fn from_credentials(
        base_url: &str,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Result<Self, AuthError> {
        let client_id = client_id
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingCredentials("client id"))?;
        let client_secret = client_secret
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingCredentials("client secret"))?;
        Ok(Self::new(base_url, client_id, client_secret))
    }

    /// Sets a custom HTTP client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    /// Returns the token endpoint URL.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl AuthFlow for ClientCredentialsFlow {
    async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let token = handle_token_response(response).await?;
        info!(
            "Obtained access token, expires at {}",
            token
                .expires_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string())
        );
        Ok(token)
    }
}
