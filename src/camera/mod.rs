//! Free-flight camera with a track-bound rider.
//!
//! The camera carries two orientations. The free frame is driven by
//! yaw/pitch input. The rider frame follows the track and advances on every
//! [`Camera::tick`], whichever mode is active, so switching modes never
//! jumps. In [`CameraMode::Bound`] the rider frame is copied into the free
//! frame at the end of each tick.

mod clock;

pub use clock::{FixedClock, FrameClock, SystemClock};

use crate::config::CameraOptions;
use crate::geom::{ClosureBlend, Point3, RailFrame, Transform, Vec3};
use crate::track::Track;

/// Pitch limit in degrees.
pub const PITCH_LIMIT: f64 = 89.0;
/// Zoom (vertical field of view) limits in degrees.
pub const ZOOM_MIN: f64 = 1.0;
pub const ZOOM_MAX: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// View follows yaw/pitch input.
    Free,
    /// View follows the rider.
    Bound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// State of the rider travelling along a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackRider {
    s: f64,
    frame: RailFrame,
    position: Point3,
    speed: f64,
    laps: u64,
}

impl TrackRider {
    fn new(track: &Track, options: &CameraOptions) -> Self {
        let frame = track.seed_frame_with(options.effective_micro_step());
        Self {
            s: 0.0,
            frame,
            position: frame.origin + frame.up * options.eye_height,
            speed: 0.0,
            laps: 0,
        }
    }

    /// Curve parameter in `[0, max_s)`.
    #[must_use]
    pub const fn s(&self) -> f64 {
        self.s
    }

    /// Frame on the rail; `frame.origin` lies on the curve.
    #[must_use]
    pub const fn frame(&self) -> &RailFrame {
        &self.frame
    }

    /// Eye position, `eye_height` above the rail along `up`.
    #[must_use]
    pub const fn position(&self) -> Point3 {
        self.position
    }

    /// Speed computed on the last tick.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub const fn laps(&self) -> u64 {
        self.laps
    }

    /// Advances `s` by the arc length covered in `dt` at the speed given by
    /// energy conservation, then propagates the frame.
    ///
    /// At most one lap of micro-steps is taken per call.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn advance(&mut self, dt: f64, track: &Track, options: &CameraOptions) {
        let period = track.period();
        let delta = options.effective_micro_step();

        let mut here = track.get_point(self.s);
        let radicand = 2.0 * options.gravity * (track.hmax() - here.y);
        self.speed = radicand.max(0.0).sqrt();
        let mut remaining = self.speed * dt;

        let max_steps = (period / delta).ceil() as usize;
        for _ in 0..max_steps {
            let ahead = track.get_point(self.s + delta);
            let d = here.distance_to(ahead);
            if d > remaining {
                break;
            }
            self.s += delta;
            remaining -= d;
            here = ahead;
        }

        if self.s >= period {
            self.laps += (self.s / period).floor() as u64;
            self.s = self.s.rem_euclid(period);
            log::debug!("rider completed lap {}", self.laps);
        }

        let blend = ClosureBlend::new(period, options.closure_blend_range);
        self.frame = track.transport_frame(&self.frame, self.s, delta, &blend);
        self.position = self.frame.origin + self.frame.up * options.eye_height;
    }
}

/// A camera that can fly freely or ride a [`Track`].
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Point3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f64,
    pitch: f64,
    zoom: f64,
    options: CameraOptions,
    mode: CameraMode,
    rider: Option<TrackRider>,
}

impl Camera {
    #[must_use]
    pub fn new(position: Point3, world_up: Vec3, options: &CameraOptions) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::new(0.0, 0.0, -1.0),
            up: world_up,
            right: Vec3::X,
            world_up: world_up.normalized_or(Vec3::Y),
            yaw: options.yaw,
            pitch: options.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            zoom: options.zoom.clamp(ZOOM_MIN, ZOOM_MAX),
            options: options.clone(),
            mode: CameraMode::Free,
            rider: None,
        };
        camera.update_vectors();
        camera
    }

    // ───────────────────────────────────────────────────────────────────────
    // Free flight
    // ───────────────────────────────────────────────────────────────────────

    /// Translates along `front` or `right` by `movement_speed * dt`.
    pub fn on_key(&mut self, direction: Movement, dt: f64) {
        let velocity = self.options.movement_speed * dt;
        match direction {
            Movement::Forward => self.position += self.front * velocity,
            Movement::Backward => self.position -= self.front * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
        }
    }

    /// Applies mouse deltas scaled by sensitivity; pitch is clamped to ±89°.
    pub fn on_mouse(&mut self, dx: f64, dy: f64) {
        self.turn(dx, dy, true);
    }

    /// Like [`Camera::on_mouse`] without the pitch clamp.
    pub fn on_mouse_unconstrained(&mut self, dx: f64, dy: f64) {
        self.turn(dx, dy, false);
    }

    fn turn(&mut self, dx: f64, dy: f64, constrain_pitch: bool) {
        self.yaw += dx * self.options.mouse_sensitivity;
        self.pitch += dy * self.options.mouse_sensitivity;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.update_vectors();
    }

    /// Scrolling up narrows the field of view; clamped to `[1°, 45°]`.
    pub fn on_scroll(&mut self, dy: f64) {
        self.zoom = (self.zoom - dy).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    fn update_vectors(&mut self) {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        let front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        self.front = front.normalized_or(self.front);
        self.right = self.front.cross(self.world_up).normalized_or(self.right);
        self.up = self.right.cross(self.front).normalized_or(self.up);
    }

    // ───────────────────────────────────────────────────────────────────────
    // Riding
    // ───────────────────────────────────────────────────────────────────────

    /// Places the rider at `s = 0` on `track`. Any previous ride is reset.
    pub fn bind(&mut self, track: &Track) {
        self.rider = Some(TrackRider::new(track, &self.options));
        log::debug!("camera bound to track with max_s {}", track.max_s());
        if self.mode == CameraMode::Bound {
            self.sync_from_rider();
        }
    }

    /// Switches between free flight and riding. Turning riding on before a
    /// track was bound is ignored and returns `false`.
    pub fn set_on_track(&mut self, on: bool) -> bool {
        if !on {
            self.mode = CameraMode::Free;
            return true;
        }
        if self.rider.is_none() {
            log::warn!("set_on_track(true) ignored: no track bound");
            return false;
        }
        self.mode = CameraMode::Bound;
        self.sync_from_rider();
        true
    }

    /// Advances the rider by `dt` seconds. Binds to `track` first if needed.
    /// Negative or non-finite `dt` is treated as zero.
    ///
    /// One call moves the rider at most one lap (`max_s / micro_step`
    /// micro-steps), however large `dt` is.
    pub fn tick(&mut self, dt: f64, track: &Track) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let rider = self
            .rider
            .get_or_insert_with(|| TrackRider::new(track, &self.options));
        rider.advance(dt, track, &self.options);
        if self.mode == CameraMode::Bound {
            self.sync_from_rider();
        }
    }

    pub fn tick_with_clock<C>(&mut self, clock: &mut C, track: &Track)
    where
        C: FrameClock + ?Sized,
    {
        let dt = clock.delta();
        self.tick(dt, track);
    }

    /// Copies the rider frame into the free frame and re-derives yaw/pitch
    /// so free flight continues from the rider's heading.
    fn sync_from_rider(&mut self) {
        let Some(rider) = self.rider else {
            return;
        };
        let front = rider.frame.front;
        self.position = rider.position;
        self.front = front;
        self.up = rider.frame.up;
        self.right = rider.frame.right;
        self.pitch = front.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = front.z.atan2(front.x).to_degrees();
    }

    // ───────────────────────────────────────────────────────────────────────
    // Matrices
    // ───────────────────────────────────────────────────────────────────────

    /// World-to-view matrix for the active frame.
    #[must_use]
    pub fn view_matrix(&self) -> Transform {
        Transform::view_from_basis(self.position, self.right, self.up, self.front)
    }

    /// Perspective projection with `zoom` as vertical field of view.
    #[must_use]
    pub fn projection_matrix(&self, aspect: f64, near: f64, far: f64) -> Transform {
        Transform::perspective(self.zoom.to_radians(), aspect, near, far)
    }

    /// Cart placement for the rider, or for the free frame when no track is
    /// bound.
    #[must_use]
    pub fn cart_transform(&self) -> Transform {
        match &self.rider {
            Some(rider) => self.cart_transform_from(
                rider.position,
                rider.frame.right,
                rider.frame.up,
                rider.frame.front,
            ),
            None => self.cart_transform_from(self.position, self.right, self.up, self.front),
        }
    }

    /// `(right, up, front)` as basis columns, translated to
    /// `eye - up * eye_height + front * cart_lead`.
    #[must_use]
    pub fn cart_transform_from(
        &self,
        eye: Point3,
        right: Vec3,
        up: Vec3,
        front: Vec3,
    ) -> Transform {
        let origin = eye - up * self.options.eye_height + front * self.options.cart_lead;
        Transform::from_axes(origin, right, up, front)
    }

    // ───────────────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────────────

    #[must_use]
    pub const fn mode(&self) -> CameraMode {
        self.mode
    }

    #[must_use]
    pub const fn position(&self) -> Point3 {
        self.position
    }

    #[must_use]
    pub const fn front(&self) -> Vec3 {
        self.front
    }

    #[must_use]
    pub const fn up(&self) -> Vec3 {
        self.up
    }

    #[must_use]
    pub const fn right(&self) -> Vec3 {
        self.right
    }

    #[must_use]
    pub const fn yaw(&self) -> f64 {
        self.yaw
    }

    #[must_use]
    pub const fn pitch(&self) -> f64 {
        self.pitch
    }

    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub const fn options(&self) -> &CameraOptions {
        &self.options
    }

    #[must_use]
    pub fn rider(&self) -> Option<&TrackRider> {
        self.rider.as_ref()
    }

    #[must_use]
    pub fn rider_frame(&self) -> Option<&RailFrame> {
        self.rider.as_ref().map(TrackRider::frame)
    }

    /// Curve parameter of the rider, `0.0` when unbound.
    #[must_use]
    pub fn s(&self) -> f64 {
        self.rider.map_or(0.0, |r| r.s)
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.rider.map_or(0.0, |r| r.speed)
    }

    #[must_use]
    pub fn laps(&self) -> u64 {
        self.rider.map_or(0, |r| r.laps)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::ORIGIN, Vec3::Y, &CameraOptions::default())
    }
}
