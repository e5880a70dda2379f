//! Per-coordinate memoization of reverse-geocoding results.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::GeocodeResult;
use crate::{ResolvedLocation, ReverseGeocoder};

/// Exact bit pattern of a coordinate pair, so cache keys never suffer
/// float rounding.
type CoordKey = (u64, u64);

/// Wraps a geocoder with a per-coordinate result cache.
///
/// Many rows share the same (lat, lon) across timestamps; the cache makes
/// each unique pair cost exactly one provider call. Empty results are
/// cached like any other. Errors are not cached, so a transient failure
/// does not poison the coordinate.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Mutex<HashMap<CoordKey, Option<ResolvedLocation>>>,
}

impl<G> CachedGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct coordinate pairs resolved so far.
    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }
}

#[async_trait]
impl<G: ReverseGeocoder> ReverseGeocoder for CachedGeocoder<G> {
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> GeocodeResult<Option<ResolvedLocation>> {
        let key = (latitude.to_bits(), longitude.to_bits());

        if let Some(hit) = self.cache.lock().await.get(&key) {
            debug!(lat = latitude, lon = longitude, "Geocode cache hit");
            return Ok(hit.clone());
        }

        let result = self.inner.reverse(latitude, longitude).await?;
        self.cache.lock().await.insert(key, result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeocodeError;
    use flux_common::AddressDetails;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake geocoder counting provider calls.
    struct CountingGeocoder {
        calls: AtomicUsize,
        fail_first: AtomicUsize,
    }

    impl CountingGeocoder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: AtomicUsize::new(0),
            }
        }

        fn failing_first(n: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: AtomicUsize::new(n),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReverseGeocoder for CountingGeocoder {
        async fn reverse(
            &self,
            latitude: f64,
            _longitude: f64,
        ) -> GeocodeResult<Option<ResolvedLocation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self
                .fail_first
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(GeocodeError::Status { status: 503 });
            }

            if latitude > 90.0 {
                return Ok(None);
            }
            Ok(Some(ResolvedLocation {
                display_name: format!("place at {latitude}"),
                address: AddressDetails {
                    country: Some("India".to_string()),
                    ..Default::default()
                },
            }))
        }
    }

    #[tokio::test]
    async fn test_single_call_per_unique_pair() {
        let geocoder = CachedGeocoder::new(CountingGeocoder::new());

        for _ in 0..5 {
            let result = geocoder.reverse(12.5, 77.5).await.unwrap();
            assert!(result.is_some());
        }

        assert_eq!(geocoder.inner.calls(), 1);
        assert_eq!(geocoder.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_pairs_each_call_once() {
        let geocoder = CachedGeocoder::new(CountingGeocoder::new());

        geocoder.reverse(12.5, 77.5).await.unwrap();
        geocoder.reverse(12.5, 78.5).await.unwrap();
        geocoder.reverse(13.5, 77.5).await.unwrap();
        geocoder.reverse(12.5, 77.5).await.unwrap();

        assert_eq!(geocoder.inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_no_result_is_cached() {
        let geocoder = CachedGeocoder::new(CountingGeocoder::new());

        assert!(geocoder.reverse(95.0, 0.0).await.unwrap().is_none());
        assert!(geocoder.reverse(95.0, 0.0).await.unwrap().is_none());

        assert_eq!(geocoder.inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let geocoder = CachedGeocoder::new(CountingGeocoder::failing_first(1));

        assert!(geocoder.reverse(12.5, 77.5).await.is_err());
        assert!(geocoder.reverse(12.5, 77.5).await.unwrap().is_some());

        assert_eq!(geocoder.inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_idempotent_results() {
        let geocoder = CachedGeocoder::new(CountingGeocoder::new());

        let first = geocoder.reverse(12.5, 77.5).await.unwrap();
        let second = geocoder.reverse(12.5, 77.5).await.unwrap();
        assert_eq!(first, second);
    }
}
