//! Amadeus access tokens

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::error::AuthError;

/// A client-credentials token issued by the Amadeus token endpoint.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    /// Usually `Bearer`.
    pub token_type: Option<String>,
    /// Unknown for tokens supplied by the caller.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: None,
            expires_at: None,
        }
    }

    pub fn with_expiry(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            expires_at: Some(expires_at),
            ..Self::new(access_token)
        }
    }

    /// A token without a known expiry never counts as expired.
    pub fn is_expired(&self) -> bool {
        self.expires_within(chrono::Duration::zero())
    }

    /// Returns `true` if the token expires less than `margin` from now.
    pub fn expires_within(&self, margin: chrono::Duration) -> bool {
        self.expires_at.is_some_and(|exp| exp <= Utc::now() + margin)
    }

    /// First 20 characters of the token followed by `...`, for logs and
    /// diagnostics.
    pub fn preview(&self) -> String {
        let prefix: String = self.access_token.chars().take(20).collect();
        format!("{}...", prefix)
    }
}

/// Source of the bearer token sent with every Amadeus request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<AccessToken, AuthError>;
}

/// Hands out a fixed token. Used in tests and for tokens minted elsewhere.
///
/// ```
/// use skyfare_lib::auth::StaticTokenProvider;
///
/// let provider = StaticTokenProvider::new("my-access-token");
/// ```
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(access_token),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<AccessToken, AuthError> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_within() {
        let token = AccessToken::with_expiry("t", Utc::now() + chrono::Duration::minutes(4));
        assert!(token.expires_within(chrono::Duration::minutes(5)));
        assert!(!token.expires_within(chrono::Duration::minutes(1)));
        assert!(!token.is_expired());
        assert!(!AccessToken::new("t").expires_within(chrono::Duration::days(1)));
    }

    #[test]
    fn test_preview() {
        let token = AccessToken::new("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(token.preview(), "abcdefghijklmnopqrst...");
        assert_eq!(AccessToken::new("short").preview(), "short...");
    }
}
