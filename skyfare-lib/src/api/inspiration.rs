//! Flight inspiration search
//!
//! Finds the cheapest destinations reachable from an origin on a given
//! departure date.
//!
//! # Example
//!
//! ```ignore
//! use skyfare_lib::api::FlightInspirationQuery;
//!
//! let query = FlightInspirationQuery::new("PAR", "2026-11-01");
//! let result = client.flight_inspiration(&query).await?;
//! let rows = result.to_rows();
//! ```

use chrono::Local;
use chrono::NaiveDate;

use crate::AmadeusClient;
use crate::error::Error;
use crate::error::FieldValidationError;
use crate::error::ValidationError;
use crate::model::FlightDestinations;

/// Path of the flight inspiration endpoint.
pub const FLIGHT_DESTINATIONS_PATH: &str = "/v1/shopping/flight-destinations";

/// How far ahead a departure date may lie.
pub const MAX_DAYS_AHEAD: i64 = 180;

/// Prefix of every flight inspiration cache key.
pub const FLIGHT_KEY_PREFIX: &str = "flight:";

/// Parameters of a flight inspiration search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightInspirationQuery {
    /// IATA code of the origin city or airport, uppercased.
    pub origin: String,
    /// Departure date as `YYYY-MM-DD`.
    pub departure_date: String,
}

impl FlightInspirationQuery {
    /// Creates a query. The origin is trimmed and uppercased.
    pub fn new(origin: impl AsRef<str>, departure_date: impl Into<String>) -> Self {
        Self {
            origin: origin.as_ref().trim().to_uppercase(),
            departure_date: departure_date.into(),
        }
    }

    /// Validates against today's local date.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_on(Local::now().date_naive())
    }

    /// Validates the query as of `today`.
    ///
    /// The origin must be a 3-letter code and the departure date a
    /// `YYYY-MM-DD` date between `today` and [`MAX_DAYS_AHEAD`] days later,
    /// both inclusive.
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.origin.is_empty() {
            errors.push(FieldValidationError::new("origin", "Origin is required"));
        } else if !is_iata_code(&self.origin) {
            errors.push(FieldValidationError::new(
                "origin",
                "Origin must be a 3-letter IATA code",
            ));
        }

        if self.departure_date.is_empty() {
            errors.push(FieldValidationError::new(
                "departureDate",
                "Departure date is required",
            ));
        } else {
            match NaiveDate::parse_from_str(&self.departure_date, "%Y-%m-%d") {
                Err(_) => errors.push(FieldValidationError::new(
                    "departureDate",
                    "Departure date must be formatted as YYYY-MM-DD",
                )),
                Ok(date) => {
                    let latest = today + chrono::Duration::days(MAX_DAYS_AHEAD);
                    if date < today || date > latest {
                        errors.push(FieldValidationError::new(
                            "departureDate",
                            format!(
                                "Date must be between today and {} days from now",
                                MAX_DAYS_AHEAD
                            ),
                        ));
                    }
                }
            }
        }

        ValidationError::check(errors)
    }

    /// Query parameters in wire form.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("origin", self.origin.clone()),
            ("departureDate", self.departure_date.clone()),
        ]
    }

    /// Key under which results of this query are cached.
    pub fn cache_key(&self) -> String {
        format!("{}{}:{}", FLIGHT_KEY_PREFIX, self.origin, self.departure_date)
    }
}

fn is_iata_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

impl AmadeusClient {
    /// Runs a validated flight inspiration search.
    ///
    /// Every returned entry carries its row id, so edits to the entry never
    /// change its identity.
    pub async fn flight_inspiration(
        &self,
        query: &FlightInspirationQuery,
    ) -> Result<FlightDestinations, Error> {
        query.validate()?;
        let result: FlightDestinations = self.get(FLIGHT_DESTINATIONS_PATH, &query.params()).await?;
        Ok(result.assign_ids())
    }

    /// Runs a flight inspiration search and returns the raw response body.
    ///
    /// No client-side validation is applied; Amadeus reports bad parameters.
    pub async fn flight_inspiration_json(
        &self,
        query: &FlightInspirationQuery,
    ) -> Result<serde_json::Value, Error> {
        self.get(FLIGHT_DESTINATIONS_PATH, &query.params()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_new_normalizes_origin() {
        let query = FlightInspirationQuery::new(" par ", "2026-11-01");
        assert_eq!(query.origin, "PAR");
        assert_eq!(query.cache_key(), "flight:PAR:2026-11-01");
    }

    #[test]
    fn test_validate_date_window() {
        assert!(FlightInspirationQuery::new("PAR", "2026-10-16").validate_on(today()).is_ok());
        assert!(FlightInspirationQuery::new("PAR", "2027-04-14").validate_on(today()).is_ok());

        let past = FlightInspirationQuery::new("PAR", "2026-10-15")
            .validate_on(today())
            .unwrap_err();
        assert!(past.field("departureDate").is_some());

        let far = FlightInspirationQuery::new("PAR", "2027-04-15").validate_on(today());
        assert!(far.is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let error = FlightInspirationQuery::new("", "01/11/2026")
            .validate_on(today())
            .unwrap_err();

        assert_eq!(error.errors.len(), 2);
        assert_eq!(error.field("origin").unwrap().message, "Origin is required");
        assert_eq!(
            error.field("departureDate").unwrap().message,
            "Departure date must be formatted as YYYY-MM-DD"
        );
    }

    #[test]
    fn test_validate_origin_shape() {
        let error = FlightInspirationQuery::new("PARIS", "2026-11-01")
            .validate_on(today())
            .unwrap_err();
        assert!(error.to_string().contains("3-letter IATA code"));
    }
}
