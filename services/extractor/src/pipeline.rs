//! The extraction pipeline: fetch, expand, enrich.

use anyhow::{Context, Result};
use flux_common::{AddressDetails, EnrichedRow, ResultTable, TimeAxis};
use geocode_client::{enrich_rows, ReverseGeocoder};
use grid_expander::expand;
use opendap_client::{GridData, OpendapClient};
use tracing::info;

/// Operational switches for a pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Cap the number of rows carried into enrichment (smoke runs against
    /// a rate-limited provider).
    pub limit: Option<usize>,
    /// Skip geocoding entirely; enrichment columns stay null.
    pub skip_enrichment: bool,
}

/// Fetch the named variable's grid from the dataset at `url`.
pub async fn fetch(client: &OpendapClient, url: &str, variable: &str) -> Result<GridData> {
    let dataset = client
        .open(url)
        .await
        .with_context(|| format!("Failed to open dataset at {url}"))?;

    info!(
        dataset = %dataset.name(),
        children = ?dataset.variable_names(),
        "Dataset children"
    );

    dataset
        .fetch_grid(variable)
        .await
        .with_context(|| format!("Failed to retrieve variable '{variable}'"))
}

/// Expand fetched grid data into rows and enrich them.
///
/// Timestamps are reconstructed from the count of the served time offsets;
/// a value array that does not match the axes is fatal before any network
/// enrichment starts.
pub async fn build_table(
    variable: &str,
    data: &GridData,
    geocoder: &dyn ReverseGeocoder,
    options: PipelineOptions,
) -> Result<ResultTable> {
    let axis = TimeAxis::cms_flux_fire();
    let times = axis.reconstruct(data.times.len());

    let mut rows = expand(&times, &data.latitudes, &data.longitudes, &data.values)
        .context("Grid expansion failed")?;

    if let Some(limit) = options.limit {
        if rows.len() > limit {
            info!(limit = limit, total = rows.len(), "Truncating rows for this run");
            rows.truncate(limit);
        }
    }

    let enriched = if options.skip_enrichment {
        rows.into_iter()
            .map(|row| EnrichedRow {
                row,
                location: None,
                address: AddressDetails::empty(),
            })
            .collect()
    } else {
        info!(rows = rows.len(), "Fetching geolocation");
        enrich_rows(rows, geocoder).await
    };

    info!(rows = enriched.len(), "Information retrieval completed");
    Ok(ResultTable::new(variable, enriched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use geocode_client::{GeocodeResult, ResolvedLocation};

    /// Deterministic provider: resolves everything to one bundle.
    struct FakeGeocoder;

    #[async_trait]
    impl ReverseGeocoder for FakeGeocoder {
        async fn reverse(
            &self,
            latitude: f64,
            longitude: f64,
        ) -> GeocodeResult<Option<ResolvedLocation>> {
            Ok(Some(ResolvedLocation {
                display_name: format!("{latitude},{longitude}"),
                address: AddressDetails {
                    country: Some("India".to_string()),
                    country_code: Some("in".to_string()),
                    ..Default::default()
                },
            }))
        }
    }

    fn sample_data() -> GridData {
        GridData {
            times: vec![0.0, 1.0],
            latitudes: vec![-10.5, 10.5],
            longitudes: vec![100.0],
            values: vec![1.0, 2.0, 3.0, 4.0],
        }
    }

    #[tokio::test]
    async fn test_build_table_happy_path() {
        let table = build_table("flux", &sample_data(), &FakeGeocoder, PipelineOptions::default())
            .await
            .unwrap();

        assert_eq!(table.variable, "flux");
        assert_eq!(table.len(), 4);

        // First timestamp is the epoch; time is the outermost axis.
        let epoch = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(table.rows[0].row.timestamp, epoch);
        assert_eq!(table.rows[1].row.timestamp, epoch);
        assert!(table.rows[2].row.timestamp > epoch);

        assert_eq!(table.rows[0].row.value, 1.0);
        assert_eq!(table.rows[3].row.value, 4.0);
        assert_eq!(table.rows[0].address.country.as_deref(), Some("India"));
        assert_eq!(table.rows[0].location.as_deref(), Some("-10.5,100"));
    }

    #[tokio::test]
    async fn test_build_table_rejects_shape_mismatch() {
        let mut data = sample_data();
        data.values.pop();

        let err = build_table("flux", &data, &FakeGeocoder, PipelineOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expansion"));
    }

    #[tokio::test]
    async fn test_limit_caps_rows() {
        let options = PipelineOptions {
            limit: Some(2),
            skip_enrichment: false,
        };
        let table = build_table("flux", &sample_data(), &FakeGeocoder, options)
            .await
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_skip_enrichment_leaves_columns_null() {
        let options = PipelineOptions {
            limit: None,
            skip_enrichment: true,
        };
        let table = build_table("flux", &sample_data(), &FakeGeocoder, options)
            .await
            .unwrap();

        assert_eq!(table.len(), 4);
        assert!(table.rows.iter().all(|r| r.location.is_none()));
        assert!(table.rows.iter().all(|r| r.address.is_empty()));
    }
}
