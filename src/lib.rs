//! Geometric core of a roller-coaster ride.
//!
//! A [`Track`] turns a cyclic control polygon into a closed Catmull–Rom
//! curve and extrudes a double rail with crossties along it. A [`Camera`]
//! flies freely or rides the track, advancing each frame at the speed a
//! frictionless cart would have after falling from [`Track::hmax`].
//!
//! ```no_run
//! use coaster_engine::{Camera, Track, TrackFileLoader, TrackOptions};
//! use std::path::Path;
//!
//! let path = Path::new("data/hills.track");
//! let track = Track::load(&TrackFileLoader, path, &TrackOptions::default())?;
//! let mut camera = Camera::default();
//! camera.bind(&track);
//! camera.set_on_track(true);
//! for _ in 0..60 {
//!     camera.tick(1.0 / 60.0, &track);
//! }
//! let view = camera.view_matrix().to_cols_array_f32();
//! # let _ = view;
//! # Ok::<(), coaster_engine::TrackError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod camera;
pub mod config;
pub mod geom;
pub mod parse;
pub mod track;

pub use camera::{Camera, CameraMode, FixedClock, FrameClock, Movement, SystemClock, TrackRider};
pub use config::{CameraOptions, Config, ConfigError, TrackOptions};
pub use geom::{MemorySink, MeshSink, Point3, RailFrame, TrackMesh, Transform, Vec3, Vertex};
pub use parse::{ControlPointLoader, TrackFileLoader, TrackLoadError};
pub use track::{Track, TrackError};
