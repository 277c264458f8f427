#![forbid(unsafe_code)]

//! Eased interpolation between two values.

use std::time::Duration;

use super::{Animation, Easing, fraction};

/// Interpolates from `from` to `to` over `duration` using `easing`.
///
/// Re-targeting with [`Tween::retarget`] restarts from the current
/// interpolated value, so an in-flight animation never jumps.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Tween {
    /// Create a tween; it starts at `from` with zero elapsed time.
    #[must_use]
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    /// A normalized `0.0 → 1.0` tween.
    #[must_use]
    pub fn unit(duration: Duration, easing: Easing) -> Self {
        Self::new(0.0, 1.0, duration, easing)
    }

    #[must_use]
    pub const fn from(&self) -> f32 {
        self.from
    }

    #[must_use]
    pub const fn to(&self) -> f32 {
        self.to
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Linear (un-eased) fraction of the duration already covered.
    #[must_use]
    pub fn linear_progress(&self) -> f32 {
        fraction(self.elapsed, self.duration)
    }

    /// Restart toward `to` from wherever the tween currently is.
    pub fn retarget(&mut self, to: f32, duration: Duration) {
        self.from = self.value();
        self.to = to;
        self.duration = duration;
        self.elapsed = Duration::ZERO;
    }

    /// Jump to the end value.
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        if self.is_complete() {
            return self.to;
        }
        let t = self.easing.apply(self.linear_progress());
        self.from + (self.to - self.from) * t
    }
}
