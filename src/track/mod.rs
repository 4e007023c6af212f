//! The closed spline track and its frozen mesh.

mod extrude;

use std::path::Path;

use thiserror::Error;

use crate::config::TrackOptions;
use crate::geom::{
    BBox, CatmullRom3, ClosureBlend, Curve3, MeshDiagnostics, MeshSink, Point3, RailFrame,
    TrackMesh, Vec3, curve_arc_length, curve_max_height,
};
use crate::parse::{ControlPointLoader, TrackLoadError};

/// Minimum control points for one Catmull–Rom window.
pub const MIN_CONTROL_POINTS: usize = 4;

/// Oversampling of the curve when checking `hmax` against the curve maximum.
const HEIGHT_CHECK_OVERSAMPLE: usize = 4;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error(transparent)]
    Load(#[from] TrackLoadError),
    #[error("a track needs at least {MIN_CONTROL_POINTS} control points, got {count}")]
    InsufficientControlPoints { count: usize },
    #[error("control point {index} is not finite")]
    NonFiniteControlPoint { index: usize },
    #[error("degenerate curve: hmax {hmax} does not exceed the curve maximum {curve_max}")]
    DegenerateCurve { hmax: f64, curve_max: f64 },
    #[error("invalid track options: {0}")]
    InvalidOptions(&'static str),
}

/// A closed Catmull–Rom track with its extruded rail mesh.
///
/// Everything is computed at construction and read-only afterwards, so a
/// `Track` can be shared by reference between any number of cameras.
#[derive(Debug, Clone)]
pub struct Track {
    curve: CatmullRom3,
    options: TrackOptions,
    hmax: f64,
    mesh: TrackMesh,
    diagnostics: MeshDiagnostics,
}

impl Track {
    /// Builds a track from displacement records, accumulating them from
    /// `options.anchor` and scaling by `options.scale`.
    pub fn from_deltas(deltas: &[Vec3], options: &TrackOptions) -> Result<Self, TrackError> {
        options.validate().map_err(TrackError::InvalidOptions)?;
        let mut current = options.anchor_point();
        let points = deltas
            .iter()
            .map(|delta| {
                current += *delta;
                Point3::from(current.to_vec3() * options.scale)
            })
            .collect();
        Self::from_control_points(points, options)
    }

    /// Builds a track through absolute control points. `anchor` and `scale`
    /// are not applied.
    pub fn from_control_points(
        points: Vec<Point3>,
        options: &TrackOptions,
    ) -> Result<Self, TrackError> {
        options.validate().map_err(TrackError::InvalidOptions)?;
        if points.len() < MIN_CONTROL_POINTS {
            return Err(TrackError::InsufficientControlPoints {
                count: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(TrackError::NonFiniteControlPoint { index });
        }

        // Ground level is the floor, so a track below y = 0 rides with hmax = 0.
        let top = points.iter().map(|p| p.y).fold(0.0, f64::max);
        let hmax = top * options.hmax_margin;
        let count = points.len();
        let curve = CatmullRom3::closed(points, options.tension)
            .ok_or(TrackError::InsufficientControlPoints { count })?;

        let samples = count * options.steps_per_segment as usize * HEIGHT_CHECK_OVERSAMPLE;
        let curve_max = curve_max_height(&curve, samples);
        if hmax <= curve_max {
            return Err(TrackError::DegenerateCurve { hmax, curve_max });
        }

        let extrusion = extrude::extrude(&curve, options);
        log::info!(
            "built track: {count} control points, hmax {hmax:.3}, {}",
            extrusion.diagnostics.summary()
        );
        log::debug!("curve max height {curve_max:.4}, tension {}", options.tension);

        Ok(Self {
            curve,
            options: options.clone(),
            hmax,
            mesh: extrusion.mesh,
            diagnostics: extrusion.diagnostics,
        })
    }

    /// Reads deltas through `loader` and builds the track from them.
    pub fn load<L>(loader: &L, path: &Path, options: &TrackOptions) -> Result<Self, TrackError>
    where
        L: ControlPointLoader + ?Sized,
    {
        let deltas = loader.load(path)?;
        Self::from_deltas(&deltas, options)
    }

    /// Point on the curve at parameter `s`. Any finite `s` is accepted and
    /// wraps modulo `max_s`.
    #[must_use]
    pub fn get_point(&self, s: f64) -> Point3 {
        self.curve.point_at(s)
    }

    #[must_use]
    pub fn mesh(&self) -> &TrackMesh {
        &self.mesh
    }

    /// Reference height for the gravity model, strictly above the curve.
    #[must_use]
    pub fn hmax(&self) -> f64 {
        self.hmax
    }

    /// Number of spline segments (equal to the control point count).
    #[must_use]
    pub fn max_s(&self) -> usize {
        self.curve.segment_count()
    }

    /// `max_s` as a parameter value.
    #[must_use]
    pub fn period(&self) -> f64 {
        self.curve.domain().1
    }

    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        self.curve.control_points()
    }

    #[must_use]
    pub fn options(&self) -> &TrackOptions {
        &self.options
    }

    #[must_use]
    pub fn diagnostics(&self) -> &MeshDiagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        self.mesh.bounds()
    }

    /// Chord length of the curve sampled at the extrusion step.
    #[must_use]
    pub fn arc_length(&self) -> f64 {
        curve_arc_length(&self.curve, self.max_s() * self.options.steps_per_segment as usize)
    }

    /// Frame at `s = 0`, seeded with world up.
    #[must_use]
    pub fn seed_frame(&self) -> RailFrame {
        self.seed_frame_with(self.options.step())
    }

    /// Frame at `s = 0` whose `front` looks `lookahead` along the curve.
    #[must_use]
    pub fn seed_frame_with(&self, lookahead: f64) -> RailFrame {
        RailFrame::seed(self.get_point(0.0), self.get_point(lookahead), Vec3::Y)
    }

    /// One frame-propagation step at the extrusion resolution, including the
    /// loop-closure blend the mesh uses.
    #[must_use]
    pub fn frame_at(&self, s: f64, prev: &RailFrame) -> RailFrame {
        let blend = ClosureBlend::new(self.period(), self.options.closure_range());
        self.transport_frame(prev, s, self.options.step(), &blend)
    }

    /// Propagates `prev` to `s`, looking `lookahead` ahead for `front` and
    /// mixing `up` toward world up by `blend.factor(s)`.
    #[must_use]
    pub fn transport_frame(
        &self,
        prev: &RailFrame,
        s: f64,
        lookahead: f64,
        blend: &ClosureBlend,
    ) -> RailFrame {
        let origin = self.get_point(s);
        prev.transport(origin, self.get_point(s + lookahead), Vec3::Y, blend.factor(s))
    }

    /// Hands a copy of the vertex stream to `sink`.
    pub fn upload<S: MeshSink>(&self, sink: &mut S) -> S::Handle {
        sink.upload(self.mesh.vertices().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hill_points() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 2.0, 0.0),
            Point3::new(4.0, 0.5, 4.0),
            Point3::new(0.0, 1.0, 4.0),
        ]
    }

    #[test]
    fn deltas_accumulate_from_anchor_and_scale() {
        let deltas = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(0.0, -0.5, 2.0),
            Vec3::new(-2.0, 0.25, 0.0),
        ];
        let track = Track::from_deltas(&deltas, &TrackOptions::default()).expect("valid track");
        assert_eq!(
            track.control_points(),
            &[
                Point3::new(-4.0, 0.0, -4.0),
                Point3::new(0.0, 2.0, -4.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(-4.0, 1.5, 0.0),
            ]
        );
        assert_relative_eq!(track.hmax(), 2.0 * 1.05);
    }

    #[test]
    fn hmax_is_floored_at_ground_level() {
        let sunken: Vec<Point3> = hill_points()
            .into_iter()
            .map(|p| Point3::new(p.x, p.y - 5.0, p.z))
            .collect();
        let track = Track::from_control_points(sunken, &TrackOptions::default())
            .expect("below-ground track builds");
        assert_eq!(track.hmax(), 0.0);
    }

    #[test]
    fn too_few_points_is_rejected() {
        let err = Track::from_control_points(hill_points()[..3].to_vec(), &TrackOptions::default())
            .expect_err("three points");
        assert!(matches!(err, TrackError::InsufficientControlPoints { count: 3 }));
    }

    #[test]
    fn non_finite_point_is_rejected() {
        let mut points = hill_points();
        points[2].z = f64::NAN;
        let err = Track::from_control_points(points, &TrackOptions::default()).expect_err("nan");
        assert!(matches!(err, TrackError::NonFiniteControlPoint { index: 2 }));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let options = TrackOptions {
            tie_every: 0,
            ..TrackOptions::default()
        };
        let err = Track::from_control_points(hill_points(), &options).expect_err("bad options");
        assert!(matches!(err, TrackError::InvalidOptions(_)));
    }

    #[test]
    fn frame_at_matches_seed_direction() {
        let track =
            Track::from_control_points(hill_points(), &TrackOptions::default()).expect("valid");
        let seed = track.seed_frame();
        let next = track.frame_at(track.options().step(), &seed);
        assert!(next.orthonormal_error() < 1e-9);
        assert!(seed.front.dot(next.front) > 0.9);
    }

    #[test]
    fn upload_copies_mesh() {
        let track =
            Track::from_control_points(hill_points(), &TrackOptions::default()).expect("valid");
        let mut sink = crate::geom::MemorySink::new();
        let handle = track.upload(&mut sink);
        assert_eq!(handle.vertices(), track.mesh().vertices());
    }
}
