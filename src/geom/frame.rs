//! Orientation frames carried along the track.
//!
//! Frames are propagated by reusing the previous right vector
//! (`up = right_prev × front`), which gives a rotation-minimizing frame that
//! does not flip at inflection points the way a Frenet binormal does. Parallel
//! transport around a closed curve does not return to its starting
//! orientation, so a [`ClosureBlend`] pulls `up` toward world up over the last
//! stretch of the loop.

use super::core::{Point3, Tolerance, Transform, Vec3};

/// An orthonormal `(right, up, front)` basis attached to a point on the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailFrame {
    pub origin: Point3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

impl RailFrame {
    /// Starting frame: `up` seeded with `world_up`, `right = front × up`, and
    /// `up` re-orthogonalized against `front`.
    #[must_use]
    pub fn seed(origin: Point3, ahead: Point3, world_up: Vec3) -> Self {
        let front = (ahead - origin).normalized_or(Vec3::Z);
        let right = front
            .cross(world_up)
            .normalized()
            .unwrap_or_else(|| front.cross(Vec3::Z).normalized_or(Vec3::X));
        let up = right.cross(front).normalized_or(world_up);
        Self {
            origin,
            front,
            up,
            right,
        }
    }

    /// Next frame along the curve.
    ///
    /// `blend` in `[0, 1]` mixes `up` toward `world_up` before the basis is
    /// re-orthogonalized; pass `0.0` outside the closure range. Degenerate
    /// axes fall back to the corresponding axis of `self`.
    #[must_use]
    pub fn transport(&self, origin: Point3, ahead: Point3, world_up: Vec3, blend: f64) -> Self {
        let front = (ahead - origin).normalized_or(self.front);
        let mut up = self.right.cross(front).normalized_or(self.up);
        if blend > 0.0 {
            up = up.lerp(world_up, blend);
        }
        let right = front.cross(up).normalized_or(self.right);
        let up = right.cross(front).normalized_or(up);
        let right = front.cross(up).normalized_or(right);
        Self {
            origin,
            front,
            up,
            right,
        }
    }

    /// Largest deviation from unit length or from mutual perpendicularity.
    #[must_use]
    pub fn orthonormal_error(&self) -> f64 {
        [
            (self.front.length() - 1.0).abs(),
            (self.up.length() - 1.0).abs(),
            (self.right.length() - 1.0).abs(),
            self.front.dot(self.up).abs(),
            self.front.dot(self.right).abs(),
            self.up.dot(self.right).abs(),
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }

    /// True when the basis drifted no more than [`Tolerance::FRAME`].
    #[must_use]
    pub fn is_orthonormal(&self) -> bool {
        self.orthonormal_error() <= Tolerance::FRAME.eps
    }

    /// True when `right ≈ front × up`.
    #[must_use]
    pub fn is_right_handed(&self) -> bool {
        self.front.cross(self.up).dot(self.right) > 0.0
    }

    /// Affine transform with `(right, up, front)` as basis columns placed at
    /// `origin + offset`.
    #[must_use]
    pub fn to_transform(&self, offset: Vec3) -> Transform {
        Transform::from_axes(self.origin + offset, self.right, self.up, self.front)
    }
}

/// Linear ramp toward world up over the final `range` units of parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosureBlend {
    end: f64,
    range: f64,
}

impl ClosureBlend {
    #[must_use]
    pub const fn new(end: f64, range: f64) -> Self {
        Self { end, range }
    }

    #[must_use]
    pub const fn start(&self) -> f64 {
        self.end - self.range
    }

    /// Mixing factor at `s`: zero before the ramp, `(s - start) / range`
    /// inside it, one at `end`.
    #[must_use]
    pub fn factor(&self, s: f64) -> f64 {
        if self.range <= 0.0 {
            return 0.0;
        }
        let start = self.start();
        if s < start || s > self.end {
            return 0.0;
        }
        ((s - start) / self.range).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn seed_on_level_ground_keeps_world_up() {
        let frame = RailFrame::seed(Point3::ORIGIN, Point3::new(0.0, 0.0, -1.0), Vec3::Y);
        assert_eq!(frame.front, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(frame.up, Vec3::Y);
        assert_eq!(frame.right, Vec3::X);
        assert!(frame.is_right_handed());
    }

    #[test]
    fn seed_on_vertical_front_stays_finite() {
        let frame = RailFrame::seed(Point3::ORIGIN, Point3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(frame.front.is_finite() && frame.up.is_finite() && frame.right.is_finite());
        assert!(frame.orthonormal_error() < 1e-12);
    }

    #[test]
    fn transport_on_straight_line_is_identity() {
        let a = RailFrame::seed(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0), Vec3::Y);
        let b = a.transport(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0), Vec3::Y, 0.0);
        assert_abs_diff_eq!(b.up.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.right.z, a.right.z, epsilon = 1e-12);
    }

    #[test]
    fn full_blend_targets_world_up_on_level_track() {
        let a = RailFrame {
            origin: Point3::ORIGIN,
            front: Vec3::X,
            up: Vec3::Z.mul_scalar(-1.0),
            right: Vec3::Y,
        };
        let b = a.transport(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0), Vec3::Y, 1.0);
        assert_abs_diff_eq!(b.up.y, 1.0, epsilon = 1e-12);
        assert!(b.orthonormal_error() < 1e-12);
    }

    #[test]
    fn skewed_basis_is_not_orthonormal() {
        let mut frame = RailFrame::seed(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0), Vec3::Y);
        assert!(frame.is_orthonormal());
        frame.up = (frame.up + frame.front * 1e-3).normalized_or(Vec3::Y);
        assert!(!frame.is_orthonormal());
        assert!(frame.orthonormal_error() > Tolerance::FRAME.eps);
    }

    #[test]
    fn closure_blend_ramps_linearly() {
        let blend = ClosureBlend::new(8.0, 2.0);
        assert_eq!(blend.factor(5.0), 0.0);
        assert_eq!(blend.factor(6.0), 0.0);
        assert_abs_diff_eq!(blend.factor(7.0), 0.5, epsilon = 1e-12);
        assert_eq!(blend.factor(8.0), 1.0);
        assert_eq!(blend.factor(8.5), 0.0);
        assert_eq!(ClosureBlend::new(8.0, 0.0).factor(8.0), 0.0);
    }
}
