//! Row enrichment: attach administrative attributes to grid rows.

use flux_common::{AddressDetails, EnrichedRow, GridRow};
use tracing::{debug, warn};

use crate::ReverseGeocoder;

/// Reverse-geocode every row, strictly in order.
///
/// A provider failure for one coordinate degrades that row to the all-null
/// bundle and the loop continues; row-level trouble never aborts the
/// table. Enrichment is all-or-nothing per row: either the full resolved
/// bundle or the empty one.
pub async fn enrich_rows(rows: Vec<GridRow>, geocoder: &dyn ReverseGeocoder) -> Vec<EnrichedRow> {
    let total = rows.len();
    let mut enriched = Vec::with_capacity(total);

    for (i, row) in rows.into_iter().enumerate() {
        let resolved = match geocoder.reverse(row.latitude, row.longitude).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(
                    lat = row.latitude,
                    lon = row.longitude,
                    error = %e,
                    "Geocoding failed, leaving row unenriched"
                );
                None
            }
        };

        let (location, address) = match resolved {
            Some(loc) => (Some(loc.display_name), loc.address),
            None => (None, AddressDetails::empty()),
        };

        enriched.push(EnrichedRow {
            row,
            location,
            address,
        });

        if (i + 1) % 100 == 0 {
            debug!(done = i + 1, total = total, "Enrichment progress");
        }
    }

    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GeocodeError, GeocodeResult};
    use crate::ResolvedLocation;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    fn row(lat: f64, lon: f64) -> GridRow {
        GridRow {
            timestamp: Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap(),
            latitude: lat,
            longitude: lon,
            value: 1.0,
        }
    }

    /// Fake provider: resolves southern-hemisphere points, finds nothing
    /// in the north, and errors on the meridian.
    struct FakeGeocoder;

    #[async_trait]
    impl ReverseGeocoder for FakeGeocoder {
        async fn reverse(
            &self,
            latitude: f64,
            longitude: f64,
        ) -> GeocodeResult<Option<ResolvedLocation>> {
            if longitude == 0.0 {
                return Err(GeocodeError::Status { status: 500 });
            }
            if latitude >= 0.0 {
                return Ok(None);
            }
            Ok(Some(ResolvedLocation {
                display_name: format!("{latitude},{longitude}"),
                address: AddressDetails {
                    country: Some("Australia".to_string()),
                    state: Some("Queensland".to_string()),
                    country_code: Some("au".to_string()),
                    ..Default::default()
                },
            }))
        }
    }

    #[tokio::test]
    async fn test_resolved_row_carries_bundle() {
        let enriched = enrich_rows(vec![row(-20.0, 145.0)], &FakeGeocoder).await;
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].location.as_deref(), Some("-20,145"));
        assert_eq!(enriched[0].address.country.as_deref(), Some("Australia"));
        assert!(enriched[0].address.pincode.is_none());
    }

    #[tokio::test]
    async fn test_no_result_row_is_all_null() {
        let enriched = enrich_rows(vec![row(45.0, 145.0)], &FakeGeocoder).await;
        assert!(enriched[0].location.is_none());
        assert!(enriched[0].address.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_degrades_and_continues() {
        let rows = vec![row(-20.0, 0.0), row(-20.0, 145.0)];
        let enriched = enrich_rows(rows, &FakeGeocoder).await;

        assert_eq!(enriched.len(), 2);
        assert!(enriched[0].address.is_empty());
        assert!(enriched[0].location.is_none());
        assert_eq!(enriched[1].address.country_code.as_deref(), Some("au"));
    }

    #[tokio::test]
    async fn test_order_preserved() {
        let rows = vec![row(-1.0, 10.0), row(-2.0, 20.0), row(-3.0, 30.0)];
        let enriched = enrich_rows(rows, &FakeGeocoder).await;

        let lats: Vec<f64> = enriched.iter().map(|r| r.row.latitude).collect();
        assert_eq!(lats, vec![-1.0, -2.0, -3.0]);
    }

    #[tokio::test]
    async fn test_enrichment_is_idempotent() {
        let first = enrich_rows(vec![row(-20.0, 145.0)], &FakeGeocoder).await;
        let second = enrich_rows(vec![row(-20.0, 145.0)], &FakeGeocoder).await;
        assert_eq!(first, second);
    }
}
