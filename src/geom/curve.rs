use super::core::{Point3, Vec3};

/// Tension of the uniform Catmull–Rom track.
pub const DEFAULT_TENSION: f64 = 0.5;

/// A parametric curve in 3D.
pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    /// Parameter interval `(start, end)` covered by the curve.
    #[must_use]
    fn domain(&self) -> (f64, f64);

    /// First derivative with respect to the parameter.
    #[must_use]
    fn derivative_at(&self, t: f64) -> Vec3;
}

/// The 4x4 cardinal-spline basis `M(τ)`.
///
/// Row `i` holds the polynomial coefficients `[1, u, u², u³]` that weight the
/// `i`-th point of the window `(A, B, C, D)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatmullRomBasis {
    m: [[f64; 4]; 4],
}

impl CatmullRomBasis {
    #[must_use]
    pub fn new(tension: f64) -> Self {
        let t = tension;
        Self {
            m: [
                [0.0, -t, 2.0 * t, -t],
                [1.0, 0.0, t - 3.0, 2.0 - t],
                [0.0, t, 3.0 - 2.0 * t, t - 2.0],
                [0.0, 0.0, -t, t],
            ],
        }
    }

    /// Blend weights for `(A, B, C, D)` at local parameter `u`.
    #[must_use]
    pub fn weights(&self, u: f64) -> [f64; 4] {
        self.weights_for_powers([1.0, u, u * u, u * u * u])
    }

    /// Weights of the first derivative with respect to `u`.
    #[must_use]
    pub fn derivative_weights(&self, u: f64) -> [f64; 4] {
        self.weights_for_powers([0.0, 1.0, 2.0 * u, 3.0 * u * u])
    }

    fn weights_for_powers(&self, powers: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (row, weight) in self.m.iter().zip(out.iter_mut()) {
            *weight = row[0] * powers[0]
                + row[1] * powers[1]
                + row[2] * powers[2]
                + row[3] * powers[3];
        }
        out
    }

    /// Evaluates `[A B C D] · M(τ) · [1, u, u², u³]ᵀ`.
    #[must_use]
    pub fn interpolate(&self, window: [Point3; 4], u: f64) -> Point3 {
        blend(window, self.weights(u))
    }
}

impl Default for CatmullRomBasis {
    fn default() -> Self {
        Self::new(DEFAULT_TENSION)
    }
}

fn blend(window: [Point3; 4], w: [f64; 4]) -> Point3 {
    let mut acc = Vec3::ZERO;
    for (p, weight) in window.iter().zip(w) {
        acc += p.to_vec3() * weight;
    }
    Point3::from(acc)
}

/// Closed Catmull–Rom spline through a cyclic control polygon.
///
/// The parameter `s` runs over `[0, N)`: `⌊s⌋` picks the window
/// `(P[i-1], P[i], P[i+1], P[i+2])` (indices mod N) and `s - ⌊s⌋` is the
/// local blend parameter. Any finite `s` is accepted; values outside
/// `[0, N)` wrap.
#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRom3 {
    points: Vec<Point3>,
    basis: CatmullRomBasis,
}

impl CatmullRom3 {
    /// Returns `None` when the polygon has fewer than 4 points, which is the
    /// smallest window the basis needs.
    #[must_use]
    pub fn closed(points: Vec<Point3>, tension: f64) -> Option<Self> {
        if points.len() < 4 {
            return None;
        }
        Some(Self {
            points,
            basis: CatmullRomBasis::new(tension),
        })
    }

    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn window(&self, s: f64) -> ([Point3; 4], f64) {
        let n = self.points.len() as i64;
        let base = s.floor();
        let i = base as i64;
        let pick = |offset: i64| self.points[(i + offset).rem_euclid(n) as usize];
        ([pick(-1), pick(0), pick(1), pick(2)], s - base)
    }
}

impl Curve3 for CatmullRom3 {
    fn point_at(&self, s: f64) -> Point3 {
        let (window, u) = self.window(s);
        self.basis.interpolate(window, u)
    }

    #[allow(clippy::cast_precision_loss)]
    fn domain(&self) -> (f64, f64) {
        (0.0, self.points.len() as f64)
    }

    fn derivative_at(&self, s: f64) -> Vec3 {
        let (window, u) = self.window(s);
        blend(window, self.basis.derivative_weights(u)).to_vec3()
    }
}

/// Computes the approximate arc length of a curve by summing chords.
///
/// # Arguments
/// * `curve` - The curve to measure.
/// * `samples` - Number of sample segments (more = more accurate).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn curve_arc_length<C: Curve3>(curve: &C, samples: usize) -> f64 {
    let samples = samples.max(1);
    let (t0, t1) = curve.domain();
    let span = t1 - t0;
    if !span.is_finite() || span == 0.0 {
        return 0.0;
    }

    let mut length = 0.0;
    let mut prev = curve.point_at(t0);
    for i in 1..=samples {
        let t = t0 + span * (i as f64 / samples as f64);
        let curr = curve.point_at(t);
        length += curr.sub_point(prev).length();
        prev = curr;
    }
    length
}

/// Largest `y` reached by the curve over `samples` uniform samples of its domain.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn curve_max_height<C: Curve3>(curve: &C, samples: usize) -> f64 {
    let samples = samples.max(1);
    let (t0, t1) = curve.domain();
    (0..=samples)
        .map(|i| curve.point_at(t0 + (t1 - t0) * (i as f64 / samples as f64)).y)
        .fold(f64::NEG_INFINITY, f64::max)
}

