//! API error types

use std::time::Duration;

use super::AmadeusErrorDetail;

/// Errors that can occur during API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the API.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Amadeus error code, if available.
        code: Option<u32>,
        /// Decoded Amadeus error entry.
        detail: Option<Box<AmadeusErrorDetail>>,
    },

    /// Network error during API call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse API response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            code: None,
            detail: None,
        }
    }

    /// Builds an HTTP error from a failed response body.
    ///
    /// The message is the first Amadeus error's detail when the body holds
    /// one, else the raw body.
    pub fn from_response(status: u16, body: String) -> Self {
        match AmadeusErrorDetail::from_body(&body) {
            Some(detail) => Self::Http {
                status,
                message: detail.message().map(str::to_string).unwrap_or(body),
                code: detail.code,
                detail: Some(Box::new(detail)),
            },
            None => Self::http(status, body),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the Amadeus error code if available.
    pub fn error_code(&self) -> Option<u32> {
        match self {
            Self::Http { code, .. } => *code,
            _ => None,
        }
    }

    /// Returns the decoded Amadeus error entry if available.
    pub fn amadeus_detail(&self) -> Option<&AmadeusErrorDetail> {
        match self {
            Self::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Network(_) => true,
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_uses_first_detail() {
        let body = r#"{"errors":[{"status":400,"code":425,"title":"INVALID DATE","detail":"Date/Time is in the past"}]}"#;
        let error = ApiError::from_response(400, body.to_string());

        assert_eq!(error.to_string(), "HTTP 400: Date/Time is in the past");
        assert_eq!(error.error_code(), Some(425));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_from_response_keeps_raw_body() {
        let error = ApiError::from_response(503, "upstream down".to_string());
        assert_eq!(error.status_code(), Some(503));
        assert!(error.amadeus_detail().is_none());
        assert!(error.is_retryable());
    }
}
