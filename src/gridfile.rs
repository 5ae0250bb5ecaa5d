//! Gridfile: the two-line build description.
//!
//! ```text
//! path/to/source/root
//! path/to/output.grid
//! ```

use crate::error::GridfileError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Parsed gridfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gridfile {
    /// Directory to snapshot.
    pub root: PathBuf,
    /// Destination image path.
    pub image: PathBuf,
}

impl Gridfile {
    pub fn load(path: &Path) -> Result<Self, GridfileError> {
        let text = std::fs::read_to_string(path).map_err(|source| GridfileError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }
}

impl FromStr for Gridfile {
    type Err = GridfileError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = text.lines().collect();
        match lines.as_slice() {
            [root, image] => Ok(Gridfile {
                root: PathBuf::from(root),
                image: PathBuf::from(image),
            }),
            short if short.len() < 2 => Err(GridfileError::TooFewLines(short.len())),
            long => Err(GridfileError::TooManyLines(long.len())),
        }
    }
}
