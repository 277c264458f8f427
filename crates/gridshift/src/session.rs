#![forbid(unsafe_code)]

//! Drag session state.
//!
//! A session is created by `start_item_drag_reorder` and dropped by
//! teardown. Phases advance `Starting → Dragging → Ending`; cancellation can
//! happen from any of them. The coordinator owns at most one session.

use std::fmt;

use gridshift_core::animation::{Animation, Progress};
use gridshift_core::{Axis, Offset, Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::config::ProxyConfig;
use crate::index::GridIndex;
use crate::recognizer::{DragRecognizer, PointerEvent};

/// Monotonic identifier of a drag session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Lifecycle phase of the coordinator's drag session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    /// No session.
    #[default]
    Idle,
    /// Pressed, waiting for the recognizer to accept.
    Starting,
    /// Proxy follows the pointer; gaps and autoscroll are live.
    Dragging,
    /// Released; proxy settling toward the drop position.
    Ending,
    /// Being torn down without commit.
    Cancelled,
}

impl SessionPhase {
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Dragging => "dragging",
            Self::Ending => "ending",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Handle returned to the host when a session starts.
///
/// Pointer callbacks carry the token; samples with a stale token are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragToken {
    pub session: SessionId,
    pub pointer_id: u32,
}

/// The single in-flight drag.
#[derive(Debug)]
pub struct DragSession {
    pub(crate) id: SessionId,
    pub(crate) phase: SessionPhase,
    pub(crate) dragged: GridIndex,
    pub(crate) insert: GridIndex,
    pub(crate) pointer_id: u32,
    pub(crate) pointer: Point,
    /// Pointer position minus the dragged cell's origin.
    pub(crate) pointer_offset: Offset,
    pub(crate) item_size: Size,
    pub(crate) scroll_axis: Axis,
    pub(crate) proxy: Progress,
    /// Proxy origin at the moment of release.
    pub(crate) release_origin: Point,
    /// Lift progress at the moment of release.
    pub(crate) release_progress: f32,
    pub(crate) drop_position: Option<Point>,
    /// Whether the host has been asked to show the overlay proxy.
    pub(crate) proxy_open: bool,
    pub(crate) recognizer: Option<Box<dyn DragRecognizer>>,
}

impl DragSession {
    pub(crate) fn new(
        id: SessionId,
        dragged: GridIndex,
        event: &PointerEvent,
        recognizer: Box<dyn DragRecognizer>,
        proxy: &ProxyConfig,
    ) -> Self {
        Self {
            id,
            phase: SessionPhase::Starting,
            dragged,
            insert: dragged,
            pointer_id: event.pointer_id,
            pointer: event.position,
            pointer_offset: Offset::ZERO,
            item_size: Size::ZERO,
            scroll_axis: Axis::Vertical,
            proxy: Progress::new(proxy.lift_duration, proxy.settle_duration, proxy.easing),
            release_origin: event.position,
            release_progress: 0.0,
            drop_position: None,
            proxy_open: false,
            recognizer: Some(recognizer),
        }
    }

    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub const fn dragged(&self) -> GridIndex {
        self.dragged
    }

    #[must_use]
    pub const fn insert(&self) -> GridIndex {
        self.insert
    }

    #[must_use]
    pub const fn pointer(&self) -> Point {
        self.pointer
    }

    #[must_use]
    pub const fn item_size(&self) -> Size {
        self.item_size
    }

    #[must_use]
    pub const fn scroll_axis(&self) -> Axis {
        self.scroll_axis
    }

    #[must_use]
    pub const fn drop_position(&self) -> Option<Point> {
        self.drop_position
    }

    #[must_use]
    pub const fn token(&self) -> DragToken {
        DragToken {
            session: self.id,
            pointer_id: self.pointer_id,
        }
    }

    #[must_use]
    pub fn proxy_progress(&self) -> f32 {
        self.proxy.value()
    }

    /// Enter `Dragging` with the captured cell geometry and start the lift.
    pub(crate) fn accept(&mut self, item_rect: Rect, scroll_axis: Axis) {
        self.phase = SessionPhase::Dragging;
        self.pointer_offset = self.pointer - item_rect.origin();
        self.item_size = item_rect.size();
        self.scroll_axis = scroll_axis;
        self.proxy.forward();
    }

    pub(crate) fn update_pointer(&mut self, position: Point) {
        self.pointer = position;
    }

    /// Top-left of the proxy.
    ///
    /// While dragging it follows the pointer. While ending it travels from
    /// the release point to the drop position as the lift progress falls
    /// from its value at release to zero.
    #[must_use]
    pub fn proxy_origin(&self) -> Point {
        let following = self.pointer - self.pointer_offset;
        match (self.phase, self.drop_position) {
            (SessionPhase::Ending, Some(drop)) => {
                if self.release_progress <= 0.0 {
                    return drop;
                }
                let t = (self.proxy.value() / self.release_progress).clamp(0.0, 1.0);
                drop + (self.release_origin - drop) * t
            }
            _ => following,
        }
    }

    #[must_use]
    pub fn proxy_rect(&self) -> Rect {
        Rect::from_origin_size(self.proxy_origin(), self.item_size)
    }

    /// Enter `Ending` and start settling toward `drop`.
    pub(crate) fn begin_drop(&mut self, drop: Point) {
        self.release_origin = self.proxy_origin();
        self.release_progress = self.proxy.value();
        self.drop_position = Some(drop);
        self.phase = SessionPhase::Ending;
        self.proxy.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::ImmediateRecognizer;
    use gridshift_core::animation::{Easing, ProgressPhase};
    use std::time::Duration;

    fn session() -> DragSession {
        let proxy = ProxyConfig {
            lift_duration: Duration::from_millis(100),
            settle_duration: Duration::from_millis(100),
            easing: Easing::Linear,
            elevation: 6.0,
        };
        DragSession::new(
            SessionId::new(1),
            GridIndex::new(0, 1),
            &PointerEvent::at(25.0, 15.0),
            Box::new(ImmediateRecognizer::new()),
            &proxy,
        )
    }

    #[test]
    fn starts_with_insert_at_origin() {
        let session = session();
        assert_eq!(session.phase(), SessionPhase::Starting);
        assert_eq!(session.insert(), session.dragged());
        assert_eq!(session.token().session, SessionId::new(1));
    }

    #[test]
    fn proxy_follows_pointer_offset() {
        let mut session = session();
        session.accept(Rect::new(20.0, 10.0, 10.0, 10.0), Axis::Vertical);
        assert_eq!(session.proxy_origin(), Point::new(20.0, 10.0));
        session.update_pointer(Point::new(45.0, 65.0));
        assert_eq!(session.proxy_rect(), Rect::new(40.0, 60.0, 10.0, 10.0));
    }

    #[test]
    fn drop_settles_toward_target() {
        let mut session = session();
        session.accept(Rect::new(20.0, 10.0, 10.0, 10.0), Axis::Vertical);
        session.proxy.tick(Duration::from_millis(100));
        session.update_pointer(Point::new(105.0, 15.0));
        session.begin_drop(Point::new(0.0, 0.0));
        assert_eq!(session.phase(), SessionPhase::Ending);
        assert_eq!(session.proxy_origin(), Point::new(100.0, 10.0));

        session.proxy.tick(Duration::from_millis(50));
        let mid = session.proxy_origin();
        assert!((mid.x - 50.0).abs() < 1e-3);
        assert!((mid.y - 5.0).abs() < 1e-3);

        session.proxy.tick(Duration::from_millis(50));
        assert_eq!(session.proxy.phase(), ProgressPhase::Dismissed);
        assert_eq!(session.proxy_origin(), Point::new(0.0, 0.0));
    }

    #[test]
    fn release_mid_lift_starts_settle_at_pointer() {
        let mut session = session();
        session.accept(Rect::new(20.0, 10.0, 10.0, 10.0), Axis::Vertical);
        session.proxy.tick(Duration::from_millis(40));
        session.update_pointer(Point::new(105.0, 15.0));
        session.begin_drop(Point::new(0.0, 0.0));
        assert_eq!(session.proxy_origin(), Point::new(100.0, 10.0));

        // 40ms of lift unwinds in 40ms of settle; halfway is halfway home.
        session.proxy.tick(Duration::from_millis(20));
        let mid = session.proxy_origin();
        assert!((mid.x - 50.0).abs() < 1e-3, "{mid:?}");
        assert!((mid.y - 5.0).abs() < 1e-3, "{mid:?}");

        session.proxy.tick(Duration::from_millis(20));
        assert_eq!(session.proxy_origin(), Point::new(0.0, 0.0));
    }

    #[test]
    fn release_before_lift_lands_on_drop() {
        let mut session = session();
        session.accept(Rect::new(20.0, 10.0, 10.0, 10.0), Axis::Vertical);
        session.begin_drop(Point::new(3.0, 4.0));
        assert_eq!(session.proxy_origin(), Point::new(3.0, 4.0));
    }
}
