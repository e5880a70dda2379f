//! Reverse geocoding for extracted grid rows.
//!
//! The geocoder is an injected dependency behind the [`ReverseGeocoder`]
//! trait rather than ambient process-wide state, so enrichment runs
//! against the live Nominatim client in production and a fake in tests.

mod cache;
mod enrich;
mod error;
mod nominatim;

use async_trait::async_trait;
use flux_common::AddressDetails;

pub use cache::CachedGeocoder;
pub use enrich::enrich_rows;
pub use error::{GeocodeError, GeocodeResult};
pub use nominatim::{NominatimClient, NominatimConfig};

/// A successful reverse-geocoding result for one coordinate pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// The provider's human-readable display name.
    pub display_name: String,
    pub address: AddressDetails,
}

/// Resolves a coordinate pair into administrative attributes.
///
/// `Ok(None)` means the provider answered but found nothing for the
/// coordinate; out-of-range coordinates surface this way rather than being
/// rejected locally. Errors are reserved for transport-level failures.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> GeocodeResult<Option<ResolvedLocation>>;
}
