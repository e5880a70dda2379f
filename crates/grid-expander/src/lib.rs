//! Cartesian expansion of gridded data into tabular rows.
//!
//! The source variable arrives as a flattened time x latitude x longitude
//! array. Expansion enumerates every (time, lat, lon) combination with time
//! as the outermost varying axis and longitude innermost, which is exactly
//! the row-major flattening order of the source array, so the i-th row is
//! assigned the i-th flattened value.
//!
//! This is a purely structural transform: no filtering, no sorting, no
//! deduplication.

mod error;

use chrono::{DateTime, Utc};
use flux_common::GridRow;

pub use error::{ExpandError, ExpandResult};

/// Expand coordinate axes and a flattened value array into one row per
/// grid cell.
///
/// Fails with [`ExpandError::ShapeMismatch`] when the value array length
/// is not exactly `times.len() * latitudes.len() * longitudes.len()`;
/// silently truncating or wrapping would corrupt every subsequent row.
pub fn expand(
    times: &[DateTime<Utc>],
    latitudes: &[f64],
    longitudes: &[f64],
    values: &[f64],
) -> ExpandResult<Vec<GridRow>> {
    let expected = times.len() * latitudes.len() * longitudes.len();
    if values.len() != expected {
        return Err(ExpandError::ShapeMismatch {
            time_len: times.len(),
            lat_len: latitudes.len(),
            lon_len: longitudes.len(),
            expected,
            actual: values.len(),
        });
    }

    let mut rows = Vec::with_capacity(expected);

    for (ti, &timestamp) in times.iter().enumerate() {
        for (li, &latitude) in latitudes.iter().enumerate() {
            let base = (ti * latitudes.len() + li) * longitudes.len();
            for (lo, &longitude) in longitudes.iter().enumerate() {
                rows.push(GridRow {
                    timestamp,
                    latitude,
                    longitude,
                    value: values[base + lo],
                });
            }
        }
    }

    Ok(rows)
}
