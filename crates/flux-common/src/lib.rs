//! Common types shared across the fireflux-extractor crates.

pub mod credentials;
pub mod table;
pub mod time;

pub use credentials::{Credentials, CredentialsError};
pub use table::{AddressDetails, EnrichedRow, GridRow, ResultTable};
pub use time::TimeAxis;
