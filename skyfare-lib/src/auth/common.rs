//! Shared authentication utilities

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;

use super::AccessToken;
use crate::error::AuthError;

/// Path of the Amadeus token endpoint below the API base URL.
pub(crate) const TOKEN_PATH: &str = "/v1/security/oauth2/token";

/// Build token endpoint URL from the API base URL.
pub(crate) fn token_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH)
}

// =============================================================================
// Token Response Parsing
// =============================================================================

/// Token response from the Amadeus token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default, deserialize_with = "deserialize_expires_in")]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Deserializes `expires_in` which can be either a number or a string.
fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::Number(n)) => Ok(Some(n)),
        Some(StringOrNumber::String(s)) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid expires_in value: {}", s))),
    }
}

impl TokenResponse {
    pub fn into_access_token(self) -> AccessToken {
        let expires_at = self
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs as i64));

        AccessToken {
            access_token: self.access_token,
            token_type: self.token_type,
            expires_at,
        }
    }
}

/// Error response from the Amadeus token endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Maps OAuth error codes to AuthError variants.
pub(crate) fn map_error_response(error: ErrorResponse) -> AuthError {
    let description = error
        .error_description
        .or(error.title)
        .unwrap_or_else(|| error.error.clone());

    match error.error.as_str() {
        "invalid_client" | "unauthorized_client" => AuthError::InvalidClient {
            message: description,
        },
        "invalid_grant" => AuthError::InvalidCredentials,
        _ => AuthError::Parse(description),
    }
}

/// Turns a token endpoint response into a token or an error.
pub(crate) async fn handle_token_response(
    response: reqwest::Response,
) -> Result<AccessToken, AuthError> {
    if response.status().is_success() {
        let token_response: TokenResponse = response.json().await?;
        Ok(token_response.into_access_token())
    } else {
        let status = response.status().as_u16();
        let mut error_response: ErrorResponse = response.json().await.unwrap_or_default();
        if error_response.error.is_empty() {
            error_response.error = format!("http_{}", status);
        }
        Err(map_error_response(error_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_accepts_string_or_number() {
        let numeric: TokenResponse = serde_json::from_str(
            r#"{"type":"amadeusOAuth2Token","access_token":"abc","token_type":"Bearer","expires_in":1799,"state":"approved"}"#,
        )
        .unwrap();
        assert_eq!(numeric.expires_in, Some(1799));
        assert_eq!(numeric.state.as_deref(), Some("approved"));

        let text: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":"1799"}"#).unwrap();
        assert_eq!(text.expires_in, Some(1799));

        let token = text.into_access_token();
        assert!(token.expires_within(Duration::seconds(1800)));
        assert!(!token.expires_within(Duration::seconds(1700)));
    }

    #[test]
    fn test_map_error_response() {
        let error: ErrorResponse = serde_json::from_str(
            r#"{"error":"invalid_client","error_description":"Client credentials are invalid","code":38187,"title":"Invalid parameters"}"#,
        )
        .unwrap();
        assert!(matches!(
            map_error_response(error),
            AuthError::InvalidClient { message } if message == "Client credentials are invalid"
        ));

        let grant = ErrorResponse {
            error: "invalid_grant".into(),
            ..Default::default()
        };
        assert!(matches!(map_error_response(grant), AuthError::InvalidCredentials));
    }

    #[test]
    fn test_token_url() {
        assert_eq!(
            token_url("https://test.api.amadeus.com/"),
            "https://test.api.amadeus.com/v1/security/oauth2/token"
        );
    }
}
