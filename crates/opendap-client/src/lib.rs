//! Minimal OPeNDAP client for NASA GES DISC gridded datasets.
//!
//! Speaks just enough of the protocol for a single extraction: fetch and
//! parse the dataset descriptor (`.dds`), then pull coordinate axes and the
//! flattened variable through `.ascii` constraint expressions. GES DISC
//! sits behind Earthdata Login (URS), a redirect handshake that needs a
//! cookie store plus basic auth on each request.
//!
//! The session lives for one `open`/extract cycle and is then dropped; it
//! is not shared or reused across extractions.

mod ascii;
mod dds;
mod error;

use std::time::Duration;

use flux_common::Credentials;
use reqwest::{redirect, Client, StatusCode};
use tracing::{debug, info};

pub use dds::{ArrayDecl, DatasetDescriptor, Dimension, VariableDecl};
pub use error::{OpendapError, OpendapResult};

/// Coordinate axes and flattened values of one gridded variable.
#[derive(Debug, Clone)]
pub struct GridData {
    /// Raw time offsets as served; downstream only their count matters.
    pub times: Vec<f64>,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    /// Variable values, flattened in row-major (time, lat, lon) order.
    pub values: Vec<f64>,
}

/// Authenticated session shared by a client and the datasets it opens.
#[derive(Clone)]
struct Session {
    client: Client,
    credentials: Credentials,
}

impl Session {
    /// GET a text resource, attaching basic auth for the URS handshake.
    async fn fetch_text(&self, url: &str) -> OpendapResult<String> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|e| OpendapError::Connection(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(OpendapError::Auth(format!(
                    "server answered {} for {url}",
                    response.status()
                )));
            }
            status => {
                return Err(OpendapError::Connection(format!(
                    "server answered {status} for {url}"
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| OpendapError::Connection(e.to_string()))?;

        // A login form in place of data means the handshake did not stick.
        if body.trim_start().starts_with('<') {
            return Err(OpendapError::Auth(
                "server returned a login page instead of data".to_string(),
            ));
        }

        Ok(body)
    }
}

/// Client for opening OPeNDAP datasets with Earthdata credentials.
pub struct OpendapClient {
    session: Session,
}

impl OpendapClient {
    /// Default per-request timeout.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(credentials: Credentials) -> OpendapResult<Self> {
        Self::with_timeout(credentials, Self::REQUEST_TIMEOUT)
    }

    pub fn with_timeout(credentials: Credentials, timeout: Duration) -> OpendapResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .cookie_store(true)
            .redirect(redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            session: Session {
                client,
                credentials,
            },
        })
    }

    /// Open a dataset: fetch and parse its descriptor.
    ///
    /// Connection or authentication failures are fatal here; there is no
    /// partial fallback.
    pub async fn open(&self, url: &str) -> OpendapResult<RemoteDataset> {
        let dds_url = format!("{url}.dds");
        debug!(url = %dds_url, "Fetching dataset descriptor");

        let body = self.session.fetch_text(&dds_url).await?;
        let descriptor = dds::parse(&body)?;

        info!(
            dataset = %descriptor.name,
            children = descriptor.variables.len(),
            "Connection established"
        );

        Ok(RemoteDataset {
            url: url.to_string(),
            descriptor,
            session: self.session.clone(),
        })
    }
}

/// An opened server-side dataset: parsed descriptor plus the session that
/// produced it. Used for one extraction, then discarded.
pub struct RemoteDataset {
    url: String,
    descriptor: DatasetDescriptor,
    session: Session,
}

impl RemoteDataset {
    /// Server-side name of the dataset.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Names of the dataset's children, for diagnostics.
    pub fn variable_names(&self) -> Vec<&str> {
        self.descriptor.variable_names()
    }

    pub fn descriptor(&self) -> &DatasetDescriptor {
        &self.descriptor
    }

    /// Retrieve the coordinate axes and flattened values of `variable`.
    pub async fn fetch_grid(&self, variable: &str) -> OpendapResult<GridData> {
        let decl = self
            .descriptor
            .variable(variable)
            .ok_or_else(|| OpendapError::VariableNotFound(variable.to_string()))?;

        let times = self.fetch_axis(decl, "time").await?;
        let latitudes = self.fetch_axis(decl, "lat").await?;
        let longitudes = self.fetch_axis(decl, "lon").await?;

        let values = self.fetch_array(&value_constraint(decl)).await?;

        info!(
            variable = %variable,
            times = times.len(),
            latitudes = latitudes.len(),
            longitudes = longitudes.len(),
            values = values.len(),
            "Raw data retrieved"
        );

        Ok(GridData {
            times,
            latitudes,
            longitudes,
            values,
        })
    }

    /// Fetch one coordinate axis, resolving it against the dataset's
    /// top-level children first and the variable's grid maps second.
    async fn fetch_axis(&self, decl: &VariableDecl, coord: &str) -> OpendapResult<Vec<f64>> {
        let constraint = axis_constraint(&self.descriptor, decl, coord)
            .ok_or_else(|| OpendapError::MissingCoordinate(coord.to_string()))?;
        self.fetch_array(&constraint).await
    }

    /// Fetch and parse one `.ascii` constrained request.
    async fn fetch_array(&self, constraint: &str) -> OpendapResult<Vec<f64>> {
        let url = format!("{}.ascii?{}", self.url, constraint);
        debug!(url = %url, "Fetching array");

        let body = self.session.fetch_text(&url).await?;
        let values = ascii::parse_values(&body)?;

        if values.is_empty() {
            return Err(OpendapError::InvalidData(format!(
                "no numeric data in response for '{constraint}'"
            )));
        }
        Ok(values)
    }
}

/// Constraint expression addressing a variable's value array.
///
/// Grid variables are addressed through their array component
/// (`flux.flux`) so the response carries no appended coordinate maps.
fn value_constraint(decl: &VariableDecl) -> String {
    if decl.is_grid() {
        format!("{0}.{0}", decl.name())
    } else {
        decl.name().to_string()
    }
}

/// Constraint expression addressing a coordinate axis, if the dataset
/// carries it.
fn axis_constraint(
    descriptor: &DatasetDescriptor,
    decl: &VariableDecl,
    coord: &str,
) -> Option<String> {
    if descriptor.variable(coord).is_some() {
        return Some(coord.to_string());
    }
    if let VariableDecl::Grid { maps, .. } = decl {
        if maps.iter().any(|m| m.name == coord) {
            return Some(format!("{}.{}", decl.name(), coord));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLUX_DDS: &str = r#"Dataset {
    Float64 lat[lat = 90];
    Float64 lon[lon = 144];
    Float64 time[time = 1];
    Grid {
     ARRAY:
        Float32 flux[time = 1][lat = 90][lon = 144];
     MAPS:
        Float64 time[time = 1];
        Float64 lat[lat = 90];
        Float64 lon[lon = 144];
    } flux;
} CMS_Flux_Fire_2010_v2.nc;
"#;

    #[test]
    fn test_value_constraint_for_grid() {
        let descriptor = dds::parse(FLUX_DDS).unwrap();
        let decl = descriptor.variable("flux").unwrap();
        assert_eq!(value_constraint(decl), "flux.flux");
    }

    #[test]
    fn test_value_constraint_for_plain_array() {
        let descriptor = dds::parse(FLUX_DDS).unwrap();
        let decl = descriptor.variable("lat").unwrap();
        assert_eq!(value_constraint(decl), "lat");
    }

    #[test]
    fn test_axis_constraint_prefers_top_level() {
        let descriptor = dds::parse(FLUX_DDS).unwrap();
        let decl = descriptor.variable("flux").unwrap();
        assert_eq!(
            axis_constraint(&descriptor, decl, "lat").as_deref(),
            Some("lat")
        );
    }

    #[test]
    fn test_axis_constraint_falls_back_to_grid_maps() {
        // Same dataset without top-level coordinate arrays.
        let text = r#"Dataset {
    Grid {
     ARRAY:
        Float32 flux[time = 1][lat = 90][lon = 144];
     MAPS:
        Float64 time[time = 1];
        Float64 lat[lat = 90];
        Float64 lon[lon = 144];
    } flux;
} CMS_Flux_Fire_2010_v2.nc;
"#;
        let descriptor = dds::parse(text).unwrap();
        let decl = descriptor.variable("flux").unwrap();
        assert_eq!(
            axis_constraint(&descriptor, decl, "time").as_deref(),
            Some("flux.time")
        );
        assert!(axis_constraint(&descriptor, decl, "level").is_none());
    }
}
