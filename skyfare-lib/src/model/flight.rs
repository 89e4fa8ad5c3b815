//! Flight inspiration search results

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::Row;
use super::Value;
use crate::error::FieldError;
use crate::table::ColumnDef;
use crate::table::PathBehavior;

/// Price of a flight destination, as returned by Amadeus.
///
/// The total is kept as the string Amadeus sends (`"123.45"`) so that edits
/// and round trips never alter its formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub total: String,
}

/// Deep links to related Amadeus searches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightLinks {
    #[serde(default)]
    pub flight_dates: Option<String>,
    #[serde(default)]
    pub flight_offers: Option<String>,
}

/// One cheapest-destination entry from the flight inspiration search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDestination {
    /// Row id assigned when the result was fetched. See [`FlightDestination::row_id`].
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub links: FlightLinks,
}

impl FlightDestination {
    /// Derives the stable row id for this entry.
    ///
    /// The id is the concatenation of origin, destination, departure date,
    /// return date and total price with whitespace and `-` removed. An id
    /// already assigned to the entry takes precedence, so edits to any of
    /// these fields never change the identity of a row.
    pub fn row_id(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }
        let raw = format!(
            "{}{}{}{}{}",
            self.origin,
            self.destination,
            self.departure_date,
            self.return_date.as_deref().unwrap_or_default(),
            self.price.total
        );
        raw.chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect()
    }

    /// Standard columns of the flight results table.
    pub fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("origin", "Origin"),
            ColumnDef::new("destination", "Destination"),
            ColumnDef::new("departureDate", "Departure Date"),
            ColumnDef::new("returnDate", "Return Date"),
            ColumnDef::new("price", "Price").with_behavior(PathBehavior::new("total")),
        ]
    }

    /// Converts this entry into a table row.
    pub fn to_row(&self) -> Row {
        let price = BTreeMap::from([("total".to_string(), Value::from(self.price.total.as_str()))]);
        let links = BTreeMap::from([
            ("flightDates".to_string(), Value::from(self.links.flight_dates.clone())),
            ("flightOffers".to_string(), Value::from(self.links.flight_offers.clone())),
        ]);

        Row::new(self.row_id())
            .set("type", self.kind.as_str())
            .set("origin", self.origin.as_str())
            .set("destination", self.destination.as_str())
            .set("departureDate", self.departure_date.as_str())
            .set("returnDate", self.return_date.clone())
            .set("price", price)
            .set("links", links)
    }
}

impl TryFrom<&Row> for FlightDestination {
    type Error = FieldError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let optional = |field: &str| -> Result<Option<String>, FieldError> {
            match row.get_string(field) {
                Ok(value) => Ok(value.map(str::to_string)),
                Err(FieldError::Missing { .. }) => Ok(None),
                Err(e) => Err(e),
            }
        };

        Ok(Self {
            id: Some(row.id().to_string()),
            kind: optional("type")?.unwrap_or_default(),
            origin: row.require_string("origin")?,
            destination: row.require_string("destination")?,
            departure_date: row.require_string("departureDate")?,
            return_date: optional("returnDate")?,
            price: Price {
                total: row.require_string("price.total")?,
            },
            links: FlightLinks {
                flight_dates: optional("links.flightDates")?,
                flight_offers: optional("links.flightOffers")?,
            },
        })
    }
}

/// Metadata of a flight inspiration response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightMeta {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// A flight inspiration search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightDestinations {
    #[serde(default)]
    pub data: Vec<FlightDestination>,
    #[serde(default)]
    pub meta: FlightMeta,
}

impl FlightDestinations {
    /// Assigns each entry its derived row id, once.
    pub fn assign_ids(mut self) -> Self {
        for entry in &mut self.data {
            if entry.id.is_none() {
                entry.id = Some(entry.row_id());
            }
        }
        self
    }

    /// Converts all entries into table rows.
    pub fn to_rows(&self) -> Vec<Row> {
        self.data.iter().map(FlightDestination::to_row).collect()
    }

    /// Replaces entries whose id matches one of `updated`.
    ///
    /// Entries without a match are kept as they are; updates without a
    /// matching entry are ignored. Returns the number of replaced entries.
    pub fn merge(&mut self, updated: &[FlightDestination]) -> usize {
        let mut replaced = 0;
        for entry in &mut self.data {
            let id = entry.row_id();
            if let Some(found) = updated.iter().find(|u| u.row_id() == id) {
                *entry = found.clone();
                replaced += 1;
            }
        }
        replaced
    }
}
