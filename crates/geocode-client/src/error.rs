//! Error types for reverse geocoding.

use thiserror::Error;

/// Result type for geocoding operations.
pub type GeocodeResult<T> = Result<T, GeocodeError>;

/// Error types for reverse geocoding.
///
/// These surface transport-level trouble only; a provider that answers but
/// resolves nothing is a `None` result, not an error.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The request could not be sent or timed out.
    #[error("Geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Geocoding provider answered {status}")]
    Status { status: u16 },

    /// The provider's payload could not be decoded.
    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),
}
