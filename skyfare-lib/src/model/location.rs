//! Airport and city lookup results

use serde::Deserialize;
use serde::Serialize;

/// Postal address of a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub city_code: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoCode {
    pub latitude: f64,
    pub longitude: f64,
}

/// Traveler traffic score of a location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Travelers {
    pub score: f64,
}

/// Analytics attached to a location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub travelers: Travelers,
}

/// An airport or city matching a keyword search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type", default)]
    pub kind: String,
    /// `AIRPORT` or `CITY`.
    pub sub_type: String,
    pub name: String,
    #[serde(default)]
    pub detailed_name: Option<String>,
    pub id: String,
    pub iata_code: String,
    #[serde(default)]
    pub time_zone_offset: Option<String>,
    #[serde(default)]
    pub geo_code: Option<GeoCode>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub analytics: Option<Analytics>,
}

impl Location {
    /// Label shown in a location picker, e.g. `PARIS (PAR)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.iata_code)
    }
}

/// Metadata of a location search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationMeta {
    #[serde(default)]
    pub count: Option<u64>,
}

/// A location search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Locations {
    #[serde(default)]
    pub data: Vec<Location>,
    #[serde(default)]
    pub meta: LocationMeta,
}
