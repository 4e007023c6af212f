//! Parser for `.track` control-point files.
//!
//! Each non-empty line holds three floats `dx dy dz` (whitespace or comma
//! separated) giving the displacement from the previous control point.
//! Anything after `#` is a comment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::geom::Vec3;

/// Failures while reading control points.
#[derive(Debug, Error)]
pub enum TrackLoadError {
    #[error("failed to read track file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Source of raw control-point deltas.
pub trait ControlPointLoader {
    fn load(&self, path: &Path) -> Result<Vec<Vec3>, TrackLoadError>;
}

/// Loads deltas from a `.track` file on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackFileLoader;

impl ControlPointLoader for TrackFileLoader {
    fn load(&self, path: &Path) -> Result<Vec<Vec3>, TrackLoadError> {
        let text = fs::read_to_string(path).map_err(|source| TrackLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let deltas = parse_str(&text)?;
        log::debug!("loaded {} deltas from {}", deltas.len(), path.display());
        Ok(deltas)
    }
}

/// Parses the contents of a `.track` file into displacement vectors.
///
/// Line numbers in errors are 1-based.
pub fn parse_str(input: &str) -> Result<Vec<Vec3>, TrackLoadError> {
    let mut deltas = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        deltas.push(parse_line(content, line)?);
    }
    log::debug!("parsed {} control-point deltas", deltas.len());
    Ok(deltas)
}

fn parse_line(content: &str, line: usize) -> Result<Vec3, TrackLoadError> {
    let fields: Vec<&str> = content
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|field| !field.is_empty())
        .collect();
    if fields.len() != 3 {
        return Err(TrackLoadError::Parse {
            line,
            message: format!("expected 3 values, found {}", fields.len()),
        });
    }

    let mut values = [0.0; 3];
    for (slot, field) in values.iter_mut().zip(&fields) {
        let value: f64 = field.parse().map_err(|err| TrackLoadError::Parse {
            line,
            message: format!("invalid number {field:?}: {err}"),
        })?;
        if !value.is_finite() {
            return Err(TrackLoadError::Parse {
                line,
                message: format!("non-finite value {field:?}"),
            });
        }
        *slot = value;
    }
    Ok(Vec3::from(values))
}
