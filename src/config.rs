//! Construction-time options for tracks and cameras.
//!
//! Defaults reproduce the stock coaster. All structs deserialize from
//! partial JSON: missing fields keep their default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{Point3, Vec3};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options for building a [`Track`](crate::track::Track).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackOptions {
    /// Starting point that file deltas accumulate from.
    pub anchor: [f64; 3],
    /// Uniform factor applied to accumulated control points.
    pub scale: f64,
    pub tension: f64,
    /// Samples per unit of spline parameter (Δs = 1 / steps).
    pub steps_per_segment: u32,
    /// A crosstie is placed every `tie_every` samples.
    pub tie_every: u32,
    pub rail_half_width: f64,
    pub rail_half_height: f64,
    /// Number of trailing samples over which `up` is blended to world up.
    pub closure_blend_steps: u32,
    /// Factor applied to the highest control point to get `hmax`.
    pub hmax_margin: f64,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            anchor: [-2.0, 0.0, -2.0],
            scale: 2.0,
            tension: crate::geom::DEFAULT_TENSION,
            steps_per_segment: 32,
            tie_every: 4,
            rail_half_width: 0.5,
            rail_half_height: 0.1,
            closure_blend_steps: 64,
            hmax_margin: 1.05,
        }
    }
}

impl TrackOptions {
    #[must_use]
    pub fn anchor_point(&self) -> Point3 {
        Point3::from(self.anchor)
    }

    /// Spline-parameter distance between consecutive samples.
    #[must_use]
    pub fn step(&self) -> f64 {
        1.0 / f64::from(self.steps_per_segment)
    }

    /// Parameter range covered by the loop-closure blend.
    #[must_use]
    pub fn closure_range(&self) -> f64 {
        f64::from(self.closure_blend_steps) * self.step()
    }

    /// Rejects values that cannot produce a mesh.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.anchor.iter().all(|v| v.is_finite()) {
            return Err("anchor must be finite");
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err("scale must be positive");
        }
        if !self.tension.is_finite() {
            return Err("tension must be finite");
        }
        if self.steps_per_segment == 0 {
            return Err("steps_per_segment must be at least 1");
        }
        if self.tie_every == 0 {
            return Err("tie_every must be at least 1");
        }
        if !(self.rail_half_width.is_finite() && self.rail_half_width > 0.0) {
            return Err("rail_half_width must be positive");
        }
        if !(self.rail_half_height.is_finite()
            && self.rail_half_height > 0.0
            && self.rail_half_height < self.rail_half_width)
        {
            return Err("rail_half_height must be positive and below rail_half_width");
        }
        if !(self.hmax_margin.is_finite() && self.hmax_margin > 0.0) {
            return Err("hmax_margin must be positive");
        }
        Ok(())
    }
}

/// Options for a [`Camera`](crate::camera::Camera).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    /// Degrees; -90 looks down -Z.
    pub yaw: f64,
    /// Degrees.
    pub pitch: f64,
    pub movement_speed: f64,
    pub mouse_sensitivity: f64,
    /// Vertical field of view in degrees.
    pub zoom: f64,
    pub gravity: f64,
    /// Spline-parameter increment of the arc-length march.
    pub micro_step: f64,
    /// Parameter range before `max_s` over which the rider's `up` is blended
    /// toward world up.
    pub closure_blend_range: f64,
    /// Rider eye height above the rail plane, along `up`.
    pub eye_height: f64,
    /// Distance along `front` from the rider's eye to the cart origin.
    pub cart_lead: f64,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            yaw: -90.0,
            pitch: 0.0,
            movement_speed: 5.0,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
            gravity: 9.8,
            micro_step: 1e-4,
            closure_blend_range: 2.0,
            eye_height: 1.0,
            cart_lead: 1.5,
        }
    }
}

impl CameraOptions {
    /// Micro-step actually used by the march; non-positive or non-finite
    /// values fall back to the default.
    #[must_use]
    pub fn effective_micro_step(&self) -> f64 {
        if self.micro_step.is_finite() && self.micro_step > 0.0 {
            self.micro_step
        } else {
            Self::default().micro_step
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub track: TrackOptions,
    pub camera: CameraOptions,
}

impl Config {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// World up used by cameras built from this config.
    #[must_use]
    pub const fn world_up(&self) -> Vec3 {
        Vec3::Y
    }
}
