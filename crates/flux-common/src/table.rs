//! Row and table types for the extracted dataset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One grid cell: a single (time, latitude, longitude) combination paired
/// with the variable value assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub value: f64,
}

/// Administrative attributes resolved by reverse geocoding.
///
/// All fields are null together when the provider returned no result for
/// the coordinate. Within a non-empty result, a field the provider did not
/// supply stays null while its siblings remain populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDetails {
    pub country: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub pincode: Option<String>,
    pub region_code: Option<String>,
    pub country_code: Option<String>,
}

impl AddressDetails {
    /// The all-null bundle used when reverse geocoding yields nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.country.is_none()
            && self.county.is_none()
            && self.state.is_none()
            && self.district.is_none()
            && self.pincode.is_none()
            && self.region_code.is_none()
            && self.country_code.is_none()
    }
}

/// A grid row plus its reverse-geocoded location attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    #[serde(flatten)]
    pub row: GridRow,
    /// Human-readable display name from the geocoder, when one resolved.
    pub location: Option<String>,
    #[serde(flatten)]
    pub address: AddressDetails,
}

/// The assembled extraction result: enriched rows in generation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTable {
    /// Name of the extracted variable, used as the value column header.
    pub variable: String,
    pub rows: Vec<EnrichedRow>,
}

impl ResultTable {
    pub fn new(variable: impl Into<String>, rows: Vec<EnrichedRow>) -> Self {
        Self {
            variable: variable.into(),
            rows,
        }
    }

    /// Column headers in output order.
    pub fn headers(&self) -> Vec<&str> {
        vec![
            "timestamp",
            "latitude",
            "longitude",
            self.variable.as_str(),
            "location",
            "country",
            "county",
            "state",
            "district",
            "pincode",
            "region_code",
            "country_code",
        ]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_bundle() {
        let bundle = AddressDetails::empty();
        assert!(bundle.is_empty());
        assert!(bundle.country.is_none());
        assert!(bundle.country_code.is_none());
    }

    #[test]
    fn test_partial_bundle_is_not_empty() {
        let bundle = AddressDetails {
            country: Some("India".to_string()),
            ..Default::default()
        };
        assert!(!bundle.is_empty());
    }

    #[test]
    fn test_headers_use_variable_name() {
        let table = ResultTable::new("flux", Vec::new());
        let headers = table.headers();
        assert_eq!(headers.len(), 12);
        assert_eq!(headers[3], "flux");
        assert_eq!(headers[0], "timestamp");
        assert_eq!(headers[11], "country_code");
    }

    #[test]
    fn test_len() {
        let row = EnrichedRow {
            row: GridRow {
                timestamp: Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap(),
                latitude: 0.5,
                longitude: 101.5,
                value: 1.25,
            },
            location: None,
            address: AddressDetails::empty(),
        };
        let table = ResultTable::new("flux", vec![row]);
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
    }
}
