#![forbid(unsafe_code)]

//! Deterministic pointer paths.
//!
//! | Path | Description |
//! |------|-------------|
//! | [`PointerScript::line`] | Evenly spaced samples from one point to another |
//! | [`PointerScript::wander`] | Seeded random samples inside a rectangle |
//! | [`PointerScript::jitter`] | Seeded samples within a radius of a point |
//!
//! The same seed always yields the same samples.

use gridshift::PointerEvent;
use gridshift_core::{Point, Rect};

/// Simple deterministic PRNG (xorshift64).
#[derive(Debug, Clone)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform in `[0, 1)`.
    fn next_unit(&mut self) -> f32 {
        (self.next() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// A scripted sequence of pointer samples for one pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerScript {
    pointer_id: u32,
    samples: Vec<Point>,
}

impl PointerScript {
    /// `steps` samples ending exactly at `to`; `from` itself is excluded.
    #[must_use]
    pub fn line(from: Point, to: Point, steps: usize) -> Self {
        let steps = steps.max(1);
        let delta = to - from;
        let samples = (1..=steps)
            .map(|i| {
                if i == steps {
                    to
                } else {
                    from + delta * (i as f32 / steps as f32)
                }
            })
            .collect();
        Self {
            pointer_id: 0,
            samples,
        }
    }

    /// `steps` seeded samples inside `bounds`.
    #[must_use]
    pub fn wander(seed: u64, bounds: Rect, steps: usize) -> Self {
        let mut rng = Rng::new(seed);
        let samples = (0..steps)
            .map(|_| {
                Point::new(
                    bounds.x + rng.next_unit() * bounds.width,
                    bounds.y + rng.next_unit() * bounds.height,
                )
            })
            .collect();
        Self {
            pointer_id: 0,
            samples,
        }
    }

    /// `steps` seeded samples within the square of half-width `radius`
    /// around `center`.
    #[must_use]
    pub fn jitter(seed: u64, center: Point, radius: f32, steps: usize) -> Self {
        let bounds = Rect::new(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        );
        Self::wander(seed, bounds, steps)
    }

    #[must_use]
    pub const fn with_pointer(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    /// Append another script's samples.
    #[must_use]
    pub fn then(mut self, next: Self) -> Self {
        self.samples.extend(next.samples);
        self
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.samples
    }

    #[must_use]
    pub fn last(&self) -> Option<Point> {
        self.samples.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples as pointer events.
    pub fn events(&self) -> impl Iterator<Item = PointerEvent> + '_ {
        self.samples
            .iter()
            .map(|&position| PointerEvent::new(self.pointer_id, position))
    }
}
