#![forbid(unsafe_code)]

//! Edge autoscroll while dragging.
//!
//! When the proxy overruns the viewport along the scroll axis, one short
//! linear step scrolls toward the overrun edge. At most one step is in
//! flight; the coordinator re-evaluates after each step completes, so
//! scrolling continues while the proxy stays past the edge and stops at the
//! scroll extent.
//!
//! # Invariants
//!
//! 1. A step never targets a position outside `[min_extent, max_extent]`.
//! 2. Each step moves in one direction only, so positions are monotonic
//!    while the overrun persists.

use std::time::Duration;

use gridshift_core::Rect;
use gridshift_core::animation::{Animation, Easing, Tween};

use crate::config::AutoscrollConfig;
use crate::host::{ScrollMetrics, Scrollable};

/// Direction of an autoscroll step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    TowardMin,
    TowardMax,
}

/// A planned step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollStep {
    pub from: f32,
    pub to: f32,
    pub direction: ScrollDirection,
}

/// What a tick did to the running step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoscrollTick {
    /// No step in flight.
    Idle,
    Running,
    /// The step landed on its target this tick.
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoscrollController {
    config: AutoscrollConfig,
    step: Option<Tween>,
}

impl AutoscrollController {
    #[must_use]
    pub const fn new(config: AutoscrollConfig) -> Self {
        Self { config, step: None }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.step.is_some()
    }

    /// Step needed for `proxy` against the current scroll state, if any.
    #[must_use]
    pub fn plan(&self, proxy: Rect, metrics: &ScrollMetrics) -> Option<ScrollStep> {
        if !self.config.enabled {
            return None;
        }
        let axis = metrics.axis;
        let leading = metrics.viewport.start(axis) - proxy.start(axis);
        if leading > 0.0 && !metrics.at_min() {
            let length = self.config.step_for(leading);
            if length <= 0.0 {
                return None;
            }
            let to = (metrics.position - length).max(metrics.min_extent);
            return Some(ScrollStep {
                from: metrics.position,
                to,
                direction: ScrollDirection::TowardMin,
            });
        }
        let trailing = proxy.end(axis) - metrics.viewport.end(axis);
        if trailing > 0.0 && !metrics.at_max() {
            let length = self.config.step_for(trailing);
            if length <= 0.0 {
                return None;
            }
            let to = (metrics.position + length).min(metrics.max_extent);
            return Some(ScrollStep {
                from: metrics.position,
                to,
                direction: ScrollDirection::TowardMax,
            });
        }
        None
    }

    /// Start a step if none is running and the proxy overruns an edge.
    pub fn maybe_start(&mut self, proxy: Rect, scrollable: &dyn Scrollable) -> Option<ScrollStep> {
        if self.step.is_some() {
            return None;
        }
        let step = self.plan(proxy, &scrollable.metrics())?;
        tracing::trace!(
            target: "gridshift.autoscroll",
            from = step.from,
            to = step.to,
            direction = ?step.direction,
            "autoscroll step"
        );
        self.step = Some(Tween::new(
            step.from,
            step.to,
            self.config.step_duration,
            Easing::Linear,
        ));
        Some(step)
    }

    /// Advance the running step and write its position to `scrollable`.
    pub fn tick(&mut self, dt: Duration, scrollable: &mut dyn Scrollable) -> AutoscrollTick {
        let Some(step) = self.step.as_mut() else {
            return AutoscrollTick::Idle;
        };
        step.tick(dt);
        scrollable.jump_to(step.value());
        if step.is_complete() {
            self.step = None;
            AutoscrollTick::Finished
        } else {
            AutoscrollTick::Running
        }
    }

    /// Abandon the running step where it is.
    pub fn stop(&mut self) {
        self.step = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridshift_core::Axis;

    struct Viewport {
        metrics: ScrollMetrics,
        jumps: Vec<f32>,
    }

    impl Scrollable for Viewport {
        fn metrics(&self) -> ScrollMetrics {
            self.metrics
        }

        fn jump_to(&mut self, position: f32) {
            self.metrics.position = position;
            self.jumps.push(position);
        }
    }

    fn viewport(position: f32) -> Viewport {
        Viewport {
            metrics: ScrollMetrics {
                position,
                min_extent: 0.0,
                max_extent: 100.0,
                viewport: Rect::new(0.0, 0.0, 200.0, 200.0),
                axis: Axis::Vertical,
            },
            jumps: Vec::new(),
        }
    }

    fn controller() -> AutoscrollController {
        AutoscrollController::new(AutoscrollConfig::default())
    }

    #[test]
    fn no_step_inside_viewport() {
        let vp = viewport(50.0);
        assert!(
            controller()
                .plan(Rect::new(0.0, 50.0, 20.0, 20.0), &vp.metrics)
                .is_none()
        );
    }

    #[test]
    fn trailing_overrun_steps_toward_max() {
        let vp = viewport(50.0);
        let step = controller()
            .plan(Rect::new(0.0, 190.0, 20.0, 20.0), &vp.metrics)
            .expect("step");
        assert_eq!(step.direction, ScrollDirection::TowardMax);
        assert_eq!(step.to, 52.0);
    }

    #[test]
    fn leading_overrun_steps_toward_min_and_clamps() {
        let vp = viewport(3.0);
        let step = controller()
            .plan(Rect::new(0.0, -500.0, 20.0, 20.0), &vp.metrics)
            .expect("step");
        assert_eq!(step.direction, ScrollDirection::TowardMin);
        assert_eq!(step.to, 0.0);
    }

    #[test]
    fn no_step_at_extent() {
        let vp = viewport(100.0);
        assert!(
            controller()
                .plan(Rect::new(0.0, 250.0, 20.0, 20.0), &vp.metrics)
                .is_none()
        );
    }

    #[test]
    fn disabled_never_plans() {
        let config = AutoscrollConfig {
            enabled: false,
            ..AutoscrollConfig::default()
        };
        let vp = viewport(50.0);
        assert!(
            AutoscrollController::new(config)
                .plan(Rect::new(0.0, 250.0, 20.0, 20.0), &vp.metrics)
                .is_none()
        );
    }

    #[test]
    fn one_step_at_a_time() {
        let mut vp = viewport(50.0);
        let mut auto = controller();
        let proxy = Rect::new(0.0, 250.0, 20.0, 20.0);
        assert!(auto.maybe_start(proxy, &vp).is_some());
        assert!(auto.maybe_start(proxy, &vp).is_none());

        assert_eq!(auto.tick(Duration::from_millis(7), &mut vp), AutoscrollTick::Running);
        assert_eq!(auto.tick(Duration::from_millis(7), &mut vp), AutoscrollTick::Finished);
        assert_eq!(vp.metrics.position, 57.0);
        assert_eq!(auto.tick(Duration::from_millis(7), &mut vp), AutoscrollTick::Idle);
        assert!(vp.jumps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn zero_velocity_plans_nothing() {
        let config = AutoscrollConfig {
            velocity_scalar: 0.0,
            ..AutoscrollConfig::default()
        };
        let mut vp = viewport(50.0);
        let mut auto = AutoscrollController::new(config);
        let proxy = Rect::new(0.0, 183.0, 20.0, 20.0);
        assert!(auto.plan(proxy, &vp.metrics).is_none());
        assert!(auto.maybe_start(proxy, &vp).is_none());
        assert_eq!(auto.tick(Duration::from_millis(14), &mut vp), AutoscrollTick::Idle);
        assert!(vp.jumps.is_empty());
    }

    #[test]
    fn stop_abandons_step() {
        let vp = viewport(50.0);
        let mut auto = controller();
        auto.maybe_start(Rect::new(0.0, 250.0, 20.0, 20.0), &vp);
        assert!(auto.is_running());
        auto.stop();
        assert!(!auto.is_running());
    }
}
