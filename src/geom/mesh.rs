use std::cell::Cell;
use std::rc::Rc;

use super::core::{BBox, Point3, Vec3};

/// One corner of a flat-shaded triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f64; 3],
    pub normal: [f64; 3],
    pub tex_coords: [f64; 2],
}

impl Vertex {
    #[must_use]
    pub fn new(position: Point3, normal: Vec3, tex_coords: [f64; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tex_coords,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point3 {
        Point3::from(self.position)
    }

    #[must_use]
    pub fn normal(&self) -> Vec3 {
        Vec3::from(self.normal)
    }
}

/// Unit-square texture coordinates for the corners `(A, B, C, D)` of a quad.
const QUAD_UVS: [[f64; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

/// Floats per vertex in [`TrackMesh::to_interleaved_f32`].
pub const INTERLEAVED_STRIDE: usize = 8;

/// Unindexed triangle soup built from flat-shaded quads.
///
/// Every three consecutive vertices form a triangle; every six form a quad.
/// The stream is append-only while a track is being built and frozen after.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMesh {
    vertices: Vec<Vertex>,
}

impl TrackMesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 6),
        }
    }

    /// Appends quad `(A, B, C, D)` as triangles `(A, B, C)` and `(C, B, D)`.
    ///
    /// The face normal is `normalize((C - A) × (B - A))`, shared by all six
    /// vertices. When the corners are degenerate, `fallback` is used and
    /// `false` is returned.
    pub fn push_quad(&mut self, corners: [Point3; 4], fallback: Vec3) -> bool {
        let [a, b, c, d] = corners;
        let derived = (c - a).cross(b - a).normalized();
        let normal = derived.unwrap_or(fallback);
        let [uv_a, uv_b, uv_c, uv_d] = QUAD_UVS;
        self.vertices.extend_from_slice(&[
            Vertex::new(a, normal, uv_a),
            Vertex::new(b, normal, uv_b),
            Vertex::new(c, normal, uv_c),
            Vertex::new(c, normal, uv_c),
            Vertex::new(b, normal, uv_b),
            Vertex::new(d, normal, uv_d),
        ]);
        derived.is_some()
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[must_use]
    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = &[Vertex]> {
        self.vertices.chunks_exact(3)
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        BBox::from_points(self.vertices.iter().map(Vertex::position))
    }

    /// Flattens to `[px, py, pz, nx, ny, nz, u, v]` per vertex.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_interleaved_f32(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.vertices.len() * INTERLEAVED_STRIDE);
        for v in &self.vertices {
            out.extend(v.position.iter().map(|&x| x as f32));
            out.extend(v.normal.iter().map(|&x| x as f32));
            out.extend(v.tex_coords.iter().map(|&x| x as f32));
        }
        out
    }
}

// ───────────────────────────────────────────────────────────────────────────
// Upload collaborator
// ───────────────────────────────────────────────────────────────────────────

/// Receives a finished vertex stream and hands back a handle that owns
/// whatever the sink allocated for it. Dropping the handle releases it.
pub trait MeshSink {
    type Handle;

    fn upload(&mut self, vertices: Vec<Vertex>) -> Self::Handle;
}

/// Sink that keeps uploads in memory and tracks how many are still alive.
#[derive(Debug, Default)]
pub struct MemorySink {
    live: Rc<Cell<usize>>,
    uploads: usize,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles currently alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.get()
    }

    /// Total uploads ever performed.
    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.uploads
    }
}

impl MeshSink for MemorySink {
    type Handle = MemoryMesh;

    fn upload(&mut self, vertices: Vec<Vertex>) -> MemoryMesh {
        self.uploads += 1;
        self.live.set(self.live.get() + 1);
        log::debug!("memory sink: uploaded {} vertices", vertices.len());
        MemoryMesh {
            vertices,
            live: Rc::clone(&self.live),
        }
    }
}

/// Handle returned by [`MemorySink`].
#[derive(Debug)]
pub struct MemoryMesh {
    vertices: Vec<Vertex>,
    live: Rc<Cell<usize>>,
}

impl MemoryMesh {
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

impl Drop for MemoryMesh {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(1));
    }
}
