//! Parsing of OPeNDAP `.ascii` data responses.
//!
//! An ASCII response repeats the constrained DDS, then a separator line of
//! dashes, then the data section. Data lines carry comma-separated values,
//! each line prefixed with an index label:
//!
//! ```text
//! Dataset {
//!     Float64 lat[lat = 4];
//! } CMS_Flux_Fire_2010_v2.nc;
//! ---------------------------------------------
//! lat[4]
//! -89.5, -87.5, -85.5, -83.5
//! ```
//!
//! Multi-dimensional arrays emit one line per outer index combination
//! (`[0][0], v, v, ...`). Labels never parse as numbers, so extraction
//! keeps every numeric token in order and drops everything else, which
//! preserves the source's row-major flattening order.

use crate::error::OpendapResult;

/// Extract the flattened numeric values of an `.ascii` response body.
pub fn parse_values(body: &str) -> OpendapResult<Vec<f64>> {
    let lines: Vec<&str> = body.lines().collect();

    // Data follows the dashed separator; servers omit the echoed header
    // for simple constraints, in which case the whole body is data.
    let data_start = lines
        .iter()
        .position(|line| is_separator(line))
        .map(|i| i + 1)
        .unwrap_or(0);

    let values: Vec<f64> = lines[data_start..]
        .iter()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<f64>().ok())
        .collect();

    Ok(values)
}

fn is_separator(line: &str) -> bool {
    line.len() >= 4 && line.bytes().all(|b| b == b'-')
}
