//! Nominatim reverse-geocoding client.
//!
//! Speaks the `/reverse?format=jsonv2` endpoint. Public Nominatim instances
//! require an identifying User-Agent and allow at most one request per
//! second on the free tier; the client enforces a minimum spacing between
//! its own requests and retries transient failures once before giving up.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use flux_common::AddressDetails;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{GeocodeError, GeocodeResult};
use crate::{ResolvedLocation, ReverseGeocoder};

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim instance.
    pub endpoint: String,
    /// Identifying User-Agent, required by the public instance's policy.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Minimum spacing between consecutive requests.
    pub min_interval: Duration,
    /// Re-attempts after a transient failure before giving up.
    pub max_retries: u32,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "fireflux-extractor/0.1".to_string(),
            timeout: Duration::from_secs(10),
            min_interval: Duration::from_secs(1),
            max_retries: 1,
        }
    }
}

/// Reverse-geocoding client for a Nominatim instance.
pub struct NominatimClient {
    client: Client,
    config: NominatimConfig,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> GeocodeResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config,
            last_request: Mutex::new(None),
        })
    }

    /// Sleep until the minimum inter-request spacing has passed.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.config.min_interval {
                tokio::time::sleep(self.config.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn request(&self, latitude: f64, longitude: f64) -> GeocodeResult<ReverseResponse> {
        let url = format!("{}/reverse", self.config.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("format", "jsonv2")])
            .query(&[("lat", latitude), ("lon", longitude)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<ReverseResponse>()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> GeocodeResult<Option<ResolvedLocation>> {
        let mut attempt = 0;
        loop {
            self.pace().await;

            match self.request(latitude, longitude).await {
                Ok(response) => return Ok(response.into_resolved()),
                Err(e) if attempt < self.config.max_retries && is_transient(&e) => {
                    attempt += 1;
                    warn!(
                        lat = latitude,
                        lon = longitude,
                        attempt = attempt,
                        error = %e,
                        "Transient geocoding failure, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Timeouts, connection drops, 5xx and 429 answers are worth one retry.
fn is_transient(error: &GeocodeError) -> bool {
    match error {
        GeocodeError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        GeocodeError::Status { status } => *status >= 500 || *status == 429,
        GeocodeError::InvalidResponse(_) => false,
    }
}

/// Wire format of a `/reverse?format=jsonv2` answer.
///
/// An unresolvable coordinate comes back as `{"error": "Unable to
/// geocode"}` with a 200 status, so the error field is part of the schema.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<ReverseAddress>,
}

/// Recognized keys of the structured address object. Anything the provider
/// omits stays `None`.
#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    state_district: Option<String>,
    #[serde(default)]
    postcode: Option<String>,
    #[serde(default, rename = "ISO3166-2-lvl4")]
    iso3166_2_lvl4: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
}

impl ReverseResponse {
    /// Collapse the wire format into the domain result. A provider error
    /// payload or a nameless answer is "no result".
    fn into_resolved(self) -> Option<ResolvedLocation> {
        if let Some(reason) = self.error {
            debug!(reason = %reason, "Provider returned no result");
            return None;
        }

        let display_name = self.display_name?;
        let address = self.address.unwrap_or_default();

        Some(ResolvedLocation {
            display_name,
            address: AddressDetails {
                country: address.country,
                county: address.county,
                state: address.state,
                district: address.state_district,
                pincode: address.postcode,
                region_code: address.iso3166_2_lvl4,
                country_code: address.country_code,
            },
        })
    }
}
