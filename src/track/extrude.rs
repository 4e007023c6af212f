//! Rail and crosstie extrusion along a closed spline.
//!
//! The spline is sampled every `Δs = 1 / steps_per_segment`. Each pair of
//! consecutive frames produces one segment of both rails (four faces each);
//! every `tie_every`-th frame also gets a six-faced tie box. Corner letters
//! below follow the rail cross-section seen looking down `front`:
//!
//! ```text
//!   A B        E F      (+up)
//!   C D   o    G H      (-up)
//!  -right          +right
//! ```

use crate::config::TrackOptions;
use crate::geom::{
    CatmullRom3, ClosureBlend, Curve3, MeshDiagnostics, Point3, RailFrame, TrackMesh, Vec3,
};

/// Tie extents relative to the rail section: width, height, depth.
const TIE_WIDTH_FACTOR: f64 = 0.9;
const TIE_THICKNESS_FACTOR: f64 = 0.7;

/// Outward direction of a face, resolved against a frame when the quad's own
/// normal is degenerate.
#[derive(Debug, Clone, Copy)]
enum Facing {
    PosRight,
    NegRight,
    PosUp,
    NegUp,
    PosFront,
    NegFront,
}

impl Facing {
    fn axis(self, frame: &RailFrame) -> Vec3 {
        match self {
            Self::PosRight => frame.right,
            Self::NegRight => -frame.right,
            Self::PosUp => frame.up,
            Self::NegUp => -frame.up,
            Self::PosFront => frame.front,
            Self::NegFront => -frame.front,
        }
    }
}

// Rail corner indices into `rail_corners`.
const A: usize = 0;
const B: usize = 1;
const C: usize = 2;
const D: usize = 3;
const E: usize = 4;
const F: usize = 5;
const G: usize = 6;
const H: usize = 7;

/// Rail faces as `(edge_from, edge_to, facing)`: the quad is
/// `(prev[from], cur[from], prev[to], cur[to])`.
const RAIL_FACES: [(usize, usize, Facing); 8] = [
    // left rail
    (B, D, Facing::PosRight),
    (A, B, Facing::PosUp),
    (C, A, Facing::NegRight),
    (D, C, Facing::NegUp),
    // right rail
    (F, H, Facing::PosRight),
    (E, F, Facing::PosUp),
    (G, E, Facing::NegRight),
    (H, G, Facing::NegUp),
];

/// Tie box faces as corner quads `(a, b, c, d)` with `d` opposite `a`.
/// Corners: 0..4 on the `-right` end, 4..8 on the `+right` end, each end
/// ordered `(+up+front, +up-front, -up-front, -up+front)`.
const TIE_FACES: [([usize; 4], Facing); 6] = [
    ([0, 4, 1, 5], Facing::PosUp),
    ([2, 6, 3, 7], Facing::NegUp),
    ([0, 3, 4, 7], Facing::PosFront),
    ([1, 5, 2, 6], Facing::NegFront),
    ([0, 1, 3, 2], Facing::NegRight),
    ([4, 7, 5, 6], Facing::PosRight),
];

/// Cross-section offsets derived from the options.
#[derive(Debug, Clone, Copy)]
struct Section {
    half_width: f64,
    inner_width: f64,
    half_height: f64,
    tie_half: [f64; 3],
}

impl Section {
    fn new(options: &TrackOptions) -> Self {
        let w = options.rail_half_width;
        let h = options.rail_half_height;
        Self {
            half_width: w,
            inner_width: w - h,
            half_height: h,
            tie_half: [TIE_WIDTH_FACTOR * w, TIE_THICKNESS_FACTOR * h, TIE_THICKNESS_FACTOR * h],
        }
    }

    fn rail_corners(&self, frame: &RailFrame) -> [Point3; 8] {
        let o = frame.origin;
        let outer = frame.right * self.half_width;
        let inner = frame.right * self.inner_width;
        let rise = frame.up * self.half_height;
        [
            o - outer + rise,
            o - inner + rise,
            o - outer - rise,
            o - inner - rise,
            o + inner + rise,
            o + outer + rise,
            o + inner - rise,
            o + outer - rise,
        ]
    }

    fn tie_corners(&self, frame: &RailFrame) -> [Point3; 8] {
        let o = frame.origin;
        let r = frame.right * self.tie_half[0];
        let u = frame.up * self.tie_half[1];
        let f = frame.front * self.tie_half[2];
        [
            o - r + u + f,
            o - r + u - f,
            o - r - u - f,
            o - r - u + f,
            o + r + u + f,
            o + r + u - f,
            o + r - u - f,
            o + r - u + f,
        ]
    }
}

/// Result of one extrusion pass.
#[derive(Debug, Clone)]
pub(crate) struct Extrusion {
    pub mesh: TrackMesh,
    pub diagnostics: MeshDiagnostics,
}

/// Marches the closed curve and emits rails and ties.
///
/// Sample `k` sits at `s = k / steps_per_segment` for `k` in
/// `1..=max_s * steps_per_segment`; the final sample lands on `s = max_s`,
/// closing the loop at the seed position.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn extrude(curve: &CatmullRom3, options: &TrackOptions) -> Extrusion {
    let section = Section::new(options);
    let steps = options.steps_per_segment as usize;
    let tie_every = options.tie_every as usize;
    let step = options.step();
    let (_, max_s) = curve.domain();
    let blend = ClosureBlend::new(max_s, options.closure_range());
    let samples = curve.segment_count() * steps;

    let ties = samples / tie_every;
    let mut mesh = TrackMesh::with_capacity(samples * RAIL_FACES.len() + ties * TIE_FACES.len());
    let mut diagnostics = MeshDiagnostics::new();
    let mut drifted = 0_usize;

    let mut prev = RailFrame::seed(curve.point_at(0.0), curve.point_at(step), Vec3::Y);
    let mut prev_corners = section.rail_corners(&prev);

    for k in 1..=samples {
        let s = k as f64 / f64::from(options.steps_per_segment);
        let origin = curve.point_at(s);
        let frame = prev.transport(origin, curve.point_at(s + step), Vec3::Y, blend.factor(s));
        if !frame.is_orthonormal() {
            drifted += 1;
        }
        let corners = section.rail_corners(&frame);

        for &(from, to, facing) in &RAIL_FACES {
            let quad = [prev_corners[from], corners[from], prev_corners[to], corners[to]];
            if !mesh.push_quad(quad, facing.axis(&frame)) {
                diagnostics.degenerate_quad_count += 1;
            }
        }
        diagnostics.rail_segment_count += 1;

        if k % tie_every == 0 {
            let box_corners = section.tie_corners(&frame);
            for &(idx, facing) in &TIE_FACES {
                let quad = idx.map(|i| box_corners[i]);
                if !mesh.push_quad(quad, facing.axis(&frame)) {
                    diagnostics.degenerate_quad_count += 1;
                }
            }
            diagnostics.tie_count += 1;
        }

        prev = frame;
        prev_corners = corners;
    }

    if diagnostics.degenerate_quad_count > 0 {
        log::warn!(
            "{} degenerate quads used their frame axis as normal",
            diagnostics.degenerate_quad_count
        );
        diagnostics.add_warning(format!(
            "{} quads had no usable corner normal (coincident control points?)",
            diagnostics.degenerate_quad_count
        ));
    }
    if drifted > 0 {
        log::warn!("{drifted} rail frames drifted from orthonormal");
        diagnostics.add_warning(format!("{drifted} rail frames are not orthonormal"));
    }
    diagnostics.vertex_count = mesh.vertex_count();
    diagnostics.triangle_count = mesh.triangle_count();
    log::debug!("extruded {samples} samples: {}", diagnostics.summary());

    Extrusion { mesh, diagnostics }
}
