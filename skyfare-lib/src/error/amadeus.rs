//! Amadeus error payloads

use serde::Deserialize;

/// One entry of an Amadeus error response.
///
/// Amadeus reports failures as `{"errors": [{...}]}`; every member of an
/// entry is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AmadeusErrorDetail {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub code: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub source: Option<AmadeusErrorSource>,
}

/// The request parameter or body member an error refers to.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AmadeusErrorSource {
    #[serde(default)]
    pub parameter: Option<String>,
    #[serde(default)]
    pub pointer: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<AmadeusErrorDetail>,
}

impl AmadeusErrorDetail {
    /// Decodes the first error entry of a response body.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()?
            .errors
            .into_iter()
            .next()
    }

    /// Human-readable message: the detail, else the title.
    pub fn message(&self) -> Option<&str> {
        self.detail.as_deref().or(self.title.as_deref())
    }
}

impl std::fmt::Display for AmadeusErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code, self.message()) {
            (Some(code), Some(message)) => write!(f, "[{}] {}", code, message),
            (None, Some(message)) => f.write_str(message),
            (Some(code), None) => write!(f, "[{}]", code),
            (None, None) => f.write_str("unknown error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_body_takes_first_error() {
        let body = r#"{"errors":[
            {"status":400,"code":477,"title":"INVALID FORMAT","detail":"departureDate must be in the future","source":{"parameter":"departureDate"}},
            {"status":400,"code":32171,"title":"MANDATORY DATA MISSING"}
        ]}"#;

        let detail = AmadeusErrorDetail::from_body(body).unwrap();
        assert_eq!(detail.code, Some(477));
        assert_eq!(detail.message(), Some("departureDate must be in the future"));
        assert_eq!(
            detail.source.and_then(|s| s.parameter).as_deref(),
            Some("departureDate")
        );
    }

    #[test]
    fn test_from_body_rejects_other_payloads() {
        assert!(AmadeusErrorDetail::from_body("<html>").is_none());
        assert!(AmadeusErrorDetail::from_body(r#"{"errors":[]}"#).is_none());
    }

    #[test]
    fn test_message_falls_back_to_title() {
        let detail = AmadeusErrorDetail {
            title: Some("SYSTEM ERROR HAS OCCURRED".into()),
            code: Some(141),
            ..Default::default()
        };
        assert_eq!(detail.to_string(), "[141] SYSTEM ERROR HAS OCCURRED");
    }
}
