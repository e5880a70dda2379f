//! Error types for OPeNDAP retrieval.

use thiserror::Error;

/// Result type for OPeNDAP client operations.
pub type OpendapResult<T> = Result<T, OpendapError>;

/// Error types for OPeNDAP retrieval.
#[derive(Debug, Error)]
pub enum OpendapError {
    /// The server could not be reached or refused the request.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The login handshake was rejected or the server answered with a
    /// login page instead of data.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// HTTP client construction failed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The requested variable is not among the dataset's children.
    #[error("Variable not found in dataset: {0}")]
    VariableNotFound(String),

    /// A required coordinate axis is missing from the dataset.
    #[error("Coordinate axis not found: {0}")]
    MissingCoordinate(String),

    /// The dataset descriptor could not be parsed.
    #[error("Invalid DDS response: {0}")]
    InvalidDds(String),

    /// A data response could not be parsed.
    #[error("Invalid data response: {0}")]
    InvalidData(String),
}
