//! Error types for grid expansion.

use thiserror::Error;

/// Result type for grid expansion operations.
pub type ExpandResult<T> = Result<T, ExpandError>;

/// Error types for grid expansion.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// The flattened value array does not match the coordinate axes.
    #[error("Shape mismatch: {time_len} time x {lat_len} lat x {lon_len} lon requires {expected} values, got {actual}")]
    ShapeMismatch {
        time_len: usize,
        lat_len: usize,
        lon_len: usize,
        expected: usize,
        actual: usize,
    },
}
