#![forbid(unsafe_code)]

//! Pointer recognizers deciding when a press becomes a drag.
//!
//! A session stays in `Starting` until its recognizer accepts. Rejection
//! cancels the session without a callback.

use std::fmt;

use gridshift_core::Point;

/// A pointer sample in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: u32,
    pub position: Point,
}

impl PointerEvent {
    #[must_use]
    pub const fn new(pointer_id: u32, position: Point) -> Self {
        Self {
            pointer_id,
            position,
        }
    }

    #[must_use]
    pub const fn at(x: f32, y: f32) -> Self {
        Self::new(0, Point::new(x, y))
    }

    #[must_use]
    pub const fn with_pointer(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}

/// Verdict of a recognizer after seeing a pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recognition {
    Pending,
    Accepted,
    Rejected,
}

/// Decides whether a pressed pointer turns into a drag.
pub trait DragRecognizer: fmt::Debug {
    /// The press that started the session.
    fn add_pointer(&mut self, event: &PointerEvent) -> Recognition;

    fn pointer_moved(&mut self, event: &PointerEvent) -> Recognition;

    /// Release any resources; called once during teardown.
    fn dispose(&mut self) {}
}

/// Accepts on the first move, or on the press itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImmediateRecognizer {
    accept_on_down: bool,
}

impl ImmediateRecognizer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accept_on_down: false,
        }
    }

    #[must_use]
    pub const fn on_down() -> Self {
        Self {
            accept_on_down: true,
        }
    }
}

impl DragRecognizer for ImmediateRecognizer {
    fn add_pointer(&mut self, _event: &PointerEvent) -> Recognition {
        if self.accept_on_down {
            Recognition::Accepted
        } else {
            Recognition::Pending
        }
    }

    fn pointer_moved(&mut self, _event: &PointerEvent) -> Recognition {
        Recognition::Accepted
    }
}

/// Accepts once the pointer has travelled `threshold` pixels from the press.
///
/// Samples from a different pointer are ignored. With `reject_other_pointers`
/// set they reject the drag instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRecognizer {
    threshold: f32,
    reject_other_pointers: bool,
    origin: Option<PointerEvent>,
}

impl ThresholdRecognizer {
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            reject_other_pointers: false,
            origin: None,
        }
    }

    #[must_use]
    pub const fn rejecting_other_pointers(mut self) -> Self {
        self.reject_other_pointers = true;
        self
    }

    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    fn crossed(&self, origin: Point, position: Point) -> bool {
        origin.distance_squared(position) >= self.threshold * self.threshold
    }
}

impl DragRecognizer for ThresholdRecognizer {
    fn add_pointer(&mut self, event: &PointerEvent) -> Recognition {
        self.origin = Some(*event);
        if self.threshold == 0.0 {
            Recognition::Accepted
        } else {
            Recognition::Pending
        }
    }

    fn pointer_moved(&mut self, event: &PointerEvent) -> Recognition {
        let Some(origin) = self.origin else {
            return Recognition::Pending;
        };
        if origin.pointer_id != event.pointer_id {
            return if self.reject_other_pointers {
                Recognition::Rejected
            } else {
                Recognition::Pending
            };
        }
        if self.crossed(origin.position, event.position) {
            Recognition::Accepted
        } else {
            Recognition::Pending
        }
    }

    fn dispose(&mut self) {
        self.origin = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_accepts_on_move() {
        let mut recognizer = ImmediateRecognizer::new();
        assert_eq!(
            recognizer.add_pointer(&PointerEvent::at(0.0, 0.0)),
            Recognition::Pending
        );
        assert_eq!(
            recognizer.pointer_moved(&PointerEvent::at(0.0, 0.0)),
            Recognition::Accepted
        );
        let mut eager = ImmediateRecognizer::on_down();
        assert_eq!(
            eager.add_pointer(&PointerEvent::at(0.0, 0.0)),
            Recognition::Accepted
        );
    }

    #[test]
    fn threshold_uses_euclidean_distance() {
        let mut recognizer = ThresholdRecognizer::new(5.0);
        recognizer.add_pointer(&PointerEvent::at(10.0, 10.0));
        assert_eq!(
            recognizer.pointer_moved(&PointerEvent::at(13.0, 13.0)),
            Recognition::Pending
        );
        assert_eq!(
            recognizer.pointer_moved(&PointerEvent::at(13.0, 14.0)),
            Recognition::Accepted
        );
    }

    #[test]
    fn threshold_ignores_or_rejects_other_pointers() {
        let far = PointerEvent::at(100.0, 100.0).with_pointer(7);

        let mut lenient = ThresholdRecognizer::new(1.0);
        lenient.add_pointer(&PointerEvent::at(0.0, 0.0));
        assert_eq!(lenient.pointer_moved(&far), Recognition::Pending);

        let mut strict = ThresholdRecognizer::new(1.0).rejecting_other_pointers();
        strict.add_pointer(&PointerEvent::at(0.0, 0.0));
        assert_eq!(strict.pointer_moved(&far), Recognition::Rejected);
    }

    #[test]
    fn move_before_press_is_pending() {
        let mut recognizer = ThresholdRecognizer::new(1.0);
        assert_eq!(
            recognizer.pointer_moved(&PointerEvent::at(50.0, 0.0)),
            Recognition::Pending
        );
        recognizer.add_pointer(&PointerEvent::at(0.0, 0.0));
        recognizer.dispose();
        assert_eq!(
            recognizer.pointer_moved(&PointerEvent::at(50.0, 0.0)),
            Recognition::Pending
        );
    }
}
