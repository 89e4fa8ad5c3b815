//! Authentication error types

/// Errors that can occur while obtaining an access token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Client id or secret not configured.
    #[error("Missing API credentials: {0}")]
    MissingCredentials(&'static str),

    /// The client id and secret were rejected.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The client is unknown or not authorized for this grant.
    #[error("Invalid client: {message}")]
    InvalidClient { message: String },

    /// Network error during authentication.
    #[error("Network error during auth: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse the token endpoint response.
    #[error("Auth response parse error: {0}")]
    Parse(String),
}
