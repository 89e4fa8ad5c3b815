//! Error types

mod amadeus;
mod api;
mod auth;
mod field;
mod validation;

use std::time::Duration;

pub use amadeus::*;
pub use api::*;
pub use auth::*;
pub use field::*;
pub use validation::*;

/// Top-level error returned by client and store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Field(#[from] FieldError),

    /// The cache backend failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Rate limited by the API and out of retries.
    #[error("Rate limited{}", .retry_after.map(|d| format!(", retry after {}s", d.as_secs())).unwrap_or_default())]
    RateLimit { retry_after: Option<Duration> },
}

impl Error {
    /// Returns the message shown to end users.
    ///
    /// For Amadeus errors this is the `detail` of the first reported error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Http { message, .. }) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_display() {
        let limited = Error::RateLimit {
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(limited.to_string(), "Rate limited, retry after 3s");
        assert_eq!(
            Error::RateLimit { retry_after: None }.to_string(),
            "Rate limited"
        );
    }

    #[test]
    fn test_user_message_prefers_api_detail() {
        let error = Error::Api(ApiError::http(400, "Invalid origin"));
        assert_eq!(error.user_message(), "Invalid origin");
    }
}
