//! Diagnostics collected while extruding a track mesh.
//!
//! Every track build returns a [`MeshDiagnostics`] alongside the vertex
//! stream. The counts are cheap to gather during extrusion and are what the
//! CLI `info` command and the build log report.
//!
//! ```ignore
//! let track = Track::from_deltas(&deltas, &TrackOptions::default())?;
//! let diag = track.diagnostics();
//! if !diag.is_clean() {
//!     for warning in &diag.warnings {
//!         eprintln!("Warning: {warning}");
//!     }
//! }
//! ```

use std::fmt;

/// Counts and warnings for one extruded track mesh.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MeshDiagnostics {
    /// Total number of vertices in the final mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the final mesh.
    pub triangle_count: usize,

    /// Number of frame pairs that produced a rail segment (both rails).
    pub rail_segment_count: usize,

    /// Number of crossties emitted.
    pub tie_count: usize,

    /// Quads whose normal could not be derived from their corners and were
    /// given the frame axis instead.
    ///
    /// Non-zero values usually point at coincident control points.
    pub degenerate_quad_count: usize,

    /// Human-readable warnings gathered during the build.
    pub warnings: Vec<String>,
}

impl MeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no degenerate quads were seen and no warnings were recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.degenerate_quad_count == 0 && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Returns a short summary string suitable for logging.
    ///
    /// Format: `"V:{vertices} T:{triangles} rails:{n} ties:{n} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "V:{} T:{} rails:{} ties:{}",
            self.vertex_count, self.triangle_count, self.rail_segment_count, self.tie_count
        )];
        if self.degenerate_quad_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_quad_count));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("warnings:{}", self.warnings.len()));
        }
        parts.join(" ")
    }
}

impl fmt::Display for MeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Track Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Rail segments: {}", self.rail_segment_count)?;
        writeln!(f, "  Ties: {}", self.tie_count)?;

        if self.degenerate_quad_count > 0 {
            writeln!(f, "  Degenerate quads (fallback normal): {}", self.degenerate_quad_count)?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        let status = if self.is_clean() { "CLEAN" } else { "ISSUES DETECTED" };
        writeln!(f, "  Status: {status}")?;

        Ok(())
    }
}
