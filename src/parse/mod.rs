//! Readers for control-point input.

pub mod track_file;

pub use track_file::{ControlPointLoader, TrackFileLoader, TrackLoadError, parse_str};
