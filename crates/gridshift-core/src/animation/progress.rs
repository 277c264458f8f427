#![forbid(unsafe_code)]

//! Bidirectional 0.0–1.0 progress controller.
//!
//! State machine: `Dismissed → Forward → Completed → Reverse → Dismissed`.
//! Reversing mid-flight keeps the current value, so a lift that is cut short
//! settles back from wherever it got to.

use std::time::Duration;

use super::{Animation, Easing};

/// Values this close to an end are snapped onto it, absorbing float drift
/// from accumulating many small ticks.
const SNAP_EPSILON: f32 = 1e-5;

/// Where a [`Progress`] controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressPhase {
    /// At 0.0 and idle.
    #[default]
    Dismissed,
    /// Running toward 1.0.
    Forward,
    /// At 1.0 and idle.
    Completed,
    /// Running toward 0.0.
    Reverse,
}

impl ProgressPhase {
    #[inline]
    #[must_use]
    pub fn is_animating(self) -> bool {
        matches!(self, Self::Forward | Self::Reverse)
    }
}

/// A progress value driven forward over `forward_duration` and back over
/// `reverse_duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    value: f32,
    phase: ProgressPhase,
    forward_duration: Duration,
    reverse_duration: Duration,
    easing: Easing,
}

impl Progress {
    #[must_use]
    pub fn new(forward_duration: Duration, reverse_duration: Duration, easing: Easing) -> Self {
        Self {
            value: 0.0,
            phase: ProgressPhase::Dismissed,
            forward_duration,
            reverse_duration,
            easing,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> ProgressPhase {
        self.phase
    }

    /// Linear progress in `[0, 1]`.
    #[must_use]
    pub const fn raw(&self) -> f32 {
        self.value
    }

    /// Eased progress in `[0, 1]`.
    #[must_use]
    pub fn eased(&self) -> f32 {
        self.easing.apply(self.value)
    }

    /// Run toward 1.0. No-op if already forward or completed.
    pub fn forward(&mut self) {
        match self.phase {
            ProgressPhase::Dismissed | ProgressPhase::Reverse => {
                self.phase = ProgressPhase::Forward;
                if self.forward_duration.is_zero() {
                    self.value = 1.0;
                    self.phase = ProgressPhase::Completed;
                }
            }
            ProgressPhase::Forward | ProgressPhase::Completed => {}
        }
    }

    /// Run toward 0.0. No-op if already reversing or dismissed.
    pub fn reverse(&mut self) {
        match self.phase {
            ProgressPhase::Completed | ProgressPhase::Forward => {
                self.phase = ProgressPhase::Reverse;
                if self.reverse_duration.is_zero() {
                    self.value = 0.0;
                    self.phase = ProgressPhase::Dismissed;
                }
            }
            ProgressPhase::Reverse | ProgressPhase::Dismissed => {}
        }
    }

    /// Jump to 0.0 without animating.
    pub fn stop(&mut self) {
        self.value = 0.0;
        self.phase = ProgressPhase::Dismissed;
    }
}

impl Animation for Progress {
    fn tick(&mut self, dt: Duration) {
        let secs = dt.as_secs_f64() as f32;
        match self.phase {
            ProgressPhase::Forward => {
                let total = self.forward_duration.as_secs_f64() as f32;
                self.value = if total > 0.0 {
                    (self.value + secs / total).min(1.0)
                } else {
                    1.0
                };
                if self.value >= 1.0 - SNAP_EPSILON {
                    self.value = 1.0;
                    self.phase = ProgressPhase::Completed;
                }
            }
            ProgressPhase::Reverse => {
                let total = self.reverse_duration.as_secs_f64() as f32;
                self.value = if total > 0.0 {
                    (self.value - secs / total).max(0.0)
                } else {
                    0.0
                };
                if self.value <= SNAP_EPSILON {
                    self.value = 0.0;
                    self.phase = ProgressPhase::Dismissed;
                }
            }
            ProgressPhase::Dismissed | ProgressPhase::Completed => {}
        }
    }

    fn is_complete(&self) -> bool {
        !self.phase.is_animating()
    }

    fn value(&self) -> f32 {
        self.eased()
    }
}
