#![forbid(unsafe_code)]

//! Reorder tuning knobs.
//!
//! Every section deserializes with `#[serde(default)]`, so a partial config
//! file only needs to name the values it overrides.

use std::time::Duration;

use gridshift_core::animation::Easing;
use serde::{Deserialize, Serialize};

use crate::error::ReorderError;

/// Timing for the gap animation of displaced cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    pub duration: Duration,
    pub easing: Easing,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(250),
            easing: Easing::EaseInOut,
        }
    }
}

/// Lift and settle animation of the floating proxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub lift_duration: Duration,
    pub settle_duration: Duration,
    pub easing: Easing,
    /// Elevation reached at full lift.
    pub elevation: f32,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            lift_duration: Duration::from_millis(250),
            settle_duration: Duration::from_millis(250),
            easing: Easing::EaseInOut,
            elevation: 6.0,
        }
    }
}

/// Edge autoscroll while a drag is in progress.
///
/// A step scrolls by `clamp(overrun, overrun_threshold, overrun_cap) *
/// velocity_scalar / coefficient` over `step_duration`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscrollConfig {
    pub enabled: bool,
    pub overrun_threshold: f32,
    pub overrun_cap: f32,
    pub coefficient: f32,
    pub velocity_scalar: f32,
    pub step_duration: Duration,
}

impl Default for AutoscrollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            overrun_threshold: 20.0,
            overrun_cap: 100.0,
            coefficient: 10.0,
            velocity_scalar: 1.0,
            step_duration: Duration::from_millis(14),
        }
    }
}

impl AutoscrollConfig {
    /// Scroll distance for a proxy overrunning the viewport edge by
    /// `overrun` pixels.
    #[must_use]
    pub fn step_for(&self, overrun: f32) -> f32 {
        overrun.clamp(self.overrun_threshold, self.overrun_cap) * self.velocity_scalar
            / self.coefficient
    }
}

/// Top-level configuration for a [`ReorderCoordinator`](crate::ReorderCoordinator).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderConfig {
    pub gap: GapConfig,
    pub proxy: ProxyConfig,
    pub autoscroll: AutoscrollConfig,
    /// Whether dropping past the last group creates a new group.
    pub allow_new_group: bool,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            gap: GapConfig::default(),
            proxy: ProxyConfig::default(),
            autoscroll: AutoscrollConfig::default(),
            allow_new_group: true,
        }
    }
}

impl ReorderConfig {
    #[must_use]
    pub fn with_gap(mut self, gap: GapConfig) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = proxy;
        self
    }

    #[must_use]
    pub fn with_autoscroll(mut self, autoscroll: AutoscrollConfig) -> Self {
        self.autoscroll = autoscroll;
        self
    }

    #[must_use]
    pub fn with_new_group(mut self, allow: bool) -> Self {
        self.allow_new_group = allow;
        self
    }

    /// Config with every animation completing on the first tick.
    #[must_use]
    pub fn instant() -> Self {
        let mut config = Self::default();
        config.gap.duration = Duration::ZERO;
        config.proxy.lift_duration = Duration::ZERO;
        config.proxy.settle_duration = Duration::ZERO;
        config.autoscroll.step_duration = Duration::ZERO;
        config
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError::InvalidConfig`] naming the first field that is
    /// out of range.
    pub fn validate(&self) -> Result<(), ReorderError> {
        let invalid = |field: &'static str, value: f32| ReorderError::InvalidConfig {
            field,
            value: f64::from(value),
        };
        let scroll = &self.autoscroll;
        if !self.proxy.elevation.is_finite() || self.proxy.elevation < 0.0 {
            return Err(invalid("proxy.elevation", self.proxy.elevation));
        }
        if !scroll.overrun_threshold.is_finite() || scroll.overrun_threshold < 0.0 {
            return Err(invalid("autoscroll.overrun_threshold", scroll.overrun_threshold));
        }
        if !scroll.overrun_cap.is_finite() || scroll.overrun_cap < scroll.overrun_threshold {
            return Err(invalid("autoscroll.overrun_cap", scroll.overrun_cap));
        }
        if !scroll.coefficient.is_finite() || scroll.coefficient <= 0.0 {
            return Err(invalid("autoscroll.coefficient", scroll.coefficient));
        }
        if !scroll.velocity_scalar.is_finite() || scroll.velocity_scalar <= 0.0 {
            return Err(invalid("autoscroll.velocity_scalar", scroll.velocity_scalar));
        }
        Ok(())
    }
}
