//! Airport and city search

use std::fmt;
use std::str::FromStr;

use crate::AmadeusClient;
use crate::error::Error;
use crate::error::FieldValidationError;
use crate::error::ValidationError;
use crate::model::Locations;

/// Path of the location search endpoint.
pub const LOCATIONS_PATH: &str = "/v1/reference-data/locations";

/// Sub-type filter sent when the query names none.
pub const DEFAULT_SUB_TYPES: &str = "CITY,AIRPORT";

/// Shortest keyword worth sending to the API.
pub const MIN_KEYWORD_LEN: usize = 2;

/// Kind of location to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationSubType {
    Airport,
    City,
    PointOfInterest,
}

impl LocationSubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Airport => "AIRPORT",
            Self::City => "CITY",
            Self::PointOfInterest => "POINT_OF_INTEREST",
        }
    }
}

impl fmt::Display for LocationSubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationSubType {
    type Err = FieldValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AIRPORT" => Ok(Self::Airport),
            "CITY" => Ok(Self::City),
            "POINT_OF_INTEREST" => Ok(Self::PointOfInterest),
            other => Err(FieldValidationError::new(
                "subType",
                format!("Unknown location sub type: {}", other),
            )),
        }
    }
}

/// Parameters of a location search.
///
/// # Example
///
/// ```
/// use skyfare_lib::api::{LocationQuery, LocationSubType};
///
/// let query = LocationQuery::new("Paris")
///     .sub_type(LocationSubType::City)
///     .country_code("FR");
///
/// assert!(query.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LocationQuery {
    pub keyword: String,
    pub sub_type: Option<LocationSubType>,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: Option<String>,
    pub page: Option<u32>,
}

impl LocationQuery {
    /// Creates a query for `keyword`.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    /// Restricts the search to one kind of location.
    pub fn sub_type(mut self, sub_type: LocationSubType) -> Self {
        self.sub_type = Some(sub_type);
        self
    }

    /// Restricts the search to one country.
    pub fn country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    /// Requests a result page.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Validates the query.
    ///
    /// The keyword needs at least [`MIN_KEYWORD_LEN`] characters after
    /// trimming; a country code must have two letters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        let keyword_len = self.keyword.trim().chars().count();
        if keyword_len == 0 {
            errors.push(FieldValidationError::new("keyword", "Keyword is required"));
        } else if keyword_len < MIN_KEYWORD_LEN {
            errors.push(FieldValidationError::new(
                "keyword",
                format!("Keyword must have at least {} characters", MIN_KEYWORD_LEN),
            ));
        }

        if let Some(code) = &self.country_code
            && !(code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()))
        {
            errors.push(FieldValidationError::new(
                "countryCode",
                "Country code must be a 2-letter ISO code",
            ));
        }

        ValidationError::check(errors)
    }

    /// Query parameters in wire form.
    ///
    /// Without a sub type both cities and airports are searched. A zero
    /// page is not sent.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("keyword", self.keyword.clone()),
            (
                "subType",
                self.sub_type
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| DEFAULT_SUB_TYPES.to_string()),
            ),
        ];
        if let Some(code) = self.country_code.as_ref().filter(|c| !c.is_empty()) {
            params.push(("countryCode", code.clone()));
        }
        if let Some(page) = self.page.filter(|p| *p > 0) {
            params.push(("page", page.to_string()));
        }
        params
    }

    /// Key under which results of this query are cached.
    pub fn cache_key(&self) -> String {
        let mut key = format!("location:{}", self.keyword.trim().to_lowercase());
        if let Some(sub_type) = self.sub_type {
            key.push_str(&format!(":{}", sub_type));
        }
        if let Some(code) = &self.country_code {
            key.push_str(&format!(":{}", code.to_uppercase()));
        }
        if let Some(page) = self.page {
            key.push_str(&format!(":p{}", page));
        }
        key
    }
}

impl AmadeusClient {
    /// Runs a validated airport and city search.
    pub async fn search_locations(&self, query: &LocationQuery) -> Result<Locations, Error> {
        query.validate()?;
        self.get(LOCATIONS_PATH, &query.params()).await
    }

    /// Runs a location search and returns the raw response body.
    ///
    /// No client-side validation is applied; Amadeus reports bad parameters.
    pub async fn search_locations_json(
        &self,
        query: &LocationQuery,
    ) -> Result<serde_json::Value, Error> {
        self.get(LOCATIONS_PATH, &query.params()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default_sub_types() {
        let params = LocationQuery::new("lon").params();
        assert_eq!(
            params,
            vec![
                ("keyword", "lon".to_string()),
                ("subType", "CITY,AIRPORT".to_string())
            ]
        );
    }

    #[test]
    fn test_params_optional_members() {
        let params = LocationQuery::new("new york")
            .sub_type(LocationSubType::Airport)
            .country_code("US")
            .page(0)
            .params();

        assert!(params.contains(&("subType", "AIRPORT".to_string())));
        assert!(params.contains(&("countryCode", "US".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "page"));
    }

    #[test]
    fn test_validate_keyword_length() {
        assert!(LocationQuery::new("p").validate().is_err());
        assert!(LocationQuery::new("  ").validate().is_err());
        assert!(LocationQuery::new("pa").validate().is_ok());
    }

    #[test]
    fn test_validate_country_code() {
        let error = LocationQuery::new("paris")
            .country_code("FRA")
            .validate()
            .unwrap_err();
        assert!(error.field("countryCode").is_some());
    }

    #[test]
    fn test_sub_type_from_str() {
        assert_eq!("city".parse::<LocationSubType>().unwrap(), LocationSubType::City);
        assert_eq!(
            "POINT_OF_INTEREST".parse::<LocationSubType>().unwrap(),
            LocationSubType::PointOfInterest
        );
        assert!("TRAIN_STATION".parse::<LocationSubType>().is_err());
    }

    #[test]
    fn test_cache_key() {
        let query = LocationQuery::new(" Paris ").sub_type(LocationSubType::City);
        assert_eq!(query.cache_key(), "location:paris:CITY");
    }
}
