//! Per-frame time sources.

use std::time::Instant;

/// Supplies the elapsed seconds since the previous call. Values are never
/// negative.
pub trait FrameClock {
    fn delta(&mut self) -> f64;
}

/// Returns the same step every call. Used for deterministic simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock {
    step: f64,
}

impl FixedClock {
    /// Negative or non-finite steps are stored as zero.
    #[must_use]
    pub fn new(step: f64) -> Self {
        let step = if step.is_finite() { step.max(0.0) } else { 0.0 };
        Self { step }
    }

    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }
}

impl FrameClock for FixedClock {
    fn delta(&mut self) -> f64 {
        self.step
    }
}

/// Wall-clock time between calls, measured with a monotonic [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn delta(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_repeats_step() {
        let mut clock = FixedClock::new(1.0 / 60.0);
        assert_eq!(clock.delta(), 1.0 / 60.0);
        assert_eq!(clock.delta(), 1.0 / 60.0);
    }

    #[test]
    fn fixed_clock_sanitizes_step() {
        assert_eq!(FixedClock::new(-1.0).step(), 0.0);
        assert_eq!(FixedClock::new(f64::NAN).step(), 0.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        for _ in 0..100 {
            assert!(clock.delta() >= 0.0);
        }
    }
}
