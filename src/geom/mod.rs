//! Geometry primitives shared by the track builder and the camera.

mod core;
mod curve;
mod diagnostics;
mod frame;
mod mesh;

pub use core::{BBox, Point3, Tolerance, Transform, Vec3};
pub use curve::{
    CatmullRom3, CatmullRomBasis, Curve3, DEFAULT_TENSION, curve_arc_length, curve_max_height,
};
pub use diagnostics::MeshDiagnostics;
pub use frame::{ClosureBlend, RailFrame};
pub use mesh::{INTERLEAVED_STRIDE, MemoryMesh, MemorySink, MeshSink, TrackMesh, Vertex};
