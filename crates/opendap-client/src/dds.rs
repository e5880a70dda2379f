//! Parsing of OPeNDAP DDS (Dataset Descriptor Structure) responses.
//!
//! A DDS lists the dataset's children as typed array declarations, with
//! gridded variables wrapped in `Grid { Array: ... Maps: ... }` blocks:
//!
//! ```text
//! Dataset {
//!     Float64 lat[lat = 90];
//!     Float64 lon[lon = 144];
//!     Float64 time[time = 1];
//!     Grid {
//!      ARRAY:
//!         Float32 flux[time = 1][lat = 90][lon = 144];
//!      MAPS:
//!         Float64 time[time = 1];
//!         Float64 lat[lat = 90];
//!         Float64 lon[lon = 144];
//!     } flux;
//! } CMS_Flux_Fire_2010_v2.nc;
//! ```

use crate::error::{OpendapError, OpendapResult};

/// A single dimension of an array declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub size: usize,
}

/// A typed array declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDecl {
    pub name: String,
    pub dtype: String,
    pub dimensions: Vec<Dimension>,
}

/// A top-level dataset child: either a plain array or a grid with
/// coordinate maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableDecl {
    Array(ArrayDecl),
    Grid { array: ArrayDecl, maps: Vec<ArrayDecl> },
}

impl VariableDecl {
    pub fn name(&self) -> &str {
        match self {
            VariableDecl::Array(decl) => &decl.name,
            VariableDecl::Grid { array, .. } => &array.name,
        }
    }

    pub fn is_grid(&self) -> bool {
        matches!(self, VariableDecl::Grid { .. })
    }

    /// The declaration holding the variable's values.
    pub fn array(&self) -> &ArrayDecl {
        match self {
            VariableDecl::Array(decl) => decl,
            VariableDecl::Grid { array, .. } => array,
        }
    }
}

/// Parsed dataset structure: name plus child declarations in DDS order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDescriptor {
    pub name: String,
    pub variables: Vec<VariableDecl>,
}

impl DatasetDescriptor {
    /// Look up a child declaration by name.
    pub fn variable(&self, name: &str) -> Option<&VariableDecl> {
        self.variables.iter().find(|v| v.name() == name)
    }

    /// Names of all children, in declaration order.
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name()).collect()
    }
}

/// Section of a Grid block currently being read.
enum GridSection {
    Array,
    Maps,
}

/// Parse a DDS response body.
pub fn parse(text: &str) -> OpendapResult<DatasetDescriptor> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    match lines.next() {
        Some(first) if first.starts_with("Dataset") && first.ends_with('{') => {}
        _ => {
            return Err(OpendapError::InvalidDds(
                "response does not begin with a Dataset block".to_string(),
            ))
        }
    }

    let mut variables = Vec::new();
    let mut dataset_name = None;

    // Grid block state: section marker plus collected declarations.
    let mut grid: Option<(GridSection, Option<ArrayDecl>, Vec<ArrayDecl>)> = None;

    for line in lines {
        if let Some((section, array, maps)) = grid.as_mut() {
            if let Some(rest) = line.strip_prefix('}') {
                let name = parse_block_name(rest)?;
                let array = array.take().ok_or_else(|| {
                    OpendapError::InvalidDds(format!("grid '{name}' has no Array declaration"))
                })?;
                if array.name != name {
                    return Err(OpendapError::InvalidDds(format!(
                        "grid '{}' closes a block declaring '{}'",
                        name, array.name
                    )));
                }
                variables.push(VariableDecl::Grid {
                    array,
                    maps: std::mem::take(maps),
                });
                grid = None;
            } else if line.eq_ignore_ascii_case("array:") {
                *section = GridSection::Array;
            } else if line.eq_ignore_ascii_case("maps:") {
                *section = GridSection::Maps;
            } else {
                let decl = parse_array_decl(line)?;
                match section {
                    GridSection::Array => *array = Some(decl),
                    GridSection::Maps => maps.push(decl),
                }
            }
        } else if line.starts_with("Grid") && line.ends_with('{') {
            grid = Some((GridSection::Array, None, Vec::new()));
        } else if let Some(rest) = line.strip_prefix('}') {
            dataset_name = Some(parse_block_name(rest)?);
            break;
        } else {
            variables.push(VariableDecl::Array(parse_array_decl(line)?));
        }
    }

    if grid.is_some() {
        return Err(OpendapError::InvalidDds(
            "unterminated Grid block".to_string(),
        ));
    }

    let name = dataset_name
        .ok_or_else(|| OpendapError::InvalidDds("missing closing dataset name".to_string()))?;

    Ok(DatasetDescriptor { name, variables })
}

/// Parse the `name;` trailer of a closing `} name;` line.
fn parse_block_name(rest: &str) -> OpendapResult<String> {
    let name = rest.trim().trim_end_matches(';').trim();
    if name.is_empty() {
        return Err(OpendapError::InvalidDds(
            "block closes without a name".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Parse a declaration line: `Float32 flux[time = 1][lat = 90][lon = 144];`
fn parse_array_decl(line: &str) -> OpendapResult<ArrayDecl> {
    let line = line.trim_end_matches(';').trim();

    let (dtype, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| OpendapError::InvalidDds(format!("malformed declaration: '{line}'")))?;

    let rest = rest.trim();
    let (name, dims_text) = match rest.find('[') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };

    if name.is_empty() || name.contains('{') {
        return Err(OpendapError::InvalidDds(format!(
            "unsupported declaration: '{line}'"
        )));
    }

    let mut dimensions = Vec::new();
    for segment in dims_text.split('[').filter(|s| !s.is_empty()) {
        let segment = segment.trim_end_matches(']').trim();
        let (dim_name, size) = match segment.split_once('=') {
            // Named dimension: `lat = 90`
            Some((n, s)) => (n.trim().to_string(), s.trim()),
            // Anonymous dimension: bare size
            None => (String::new(), segment),
        };
        let size: usize = size.parse().map_err(|_| {
            OpendapError::InvalidDds(format!("invalid dimension size in '{line}'"))
        })?;
        dimensions.push(Dimension {
            name: dim_name,
            size,
        });
    }

    Ok(ArrayDecl {
        name: name.to_string(),
        dtype: dtype.to_string(),
        dimensions,
    })
}
