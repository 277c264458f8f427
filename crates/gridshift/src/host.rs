#![forbid(unsafe_code)]

//! Host-facing traits.
//!
//! The coordinator never looks anything up on its own: the host passes
//! itself into every call, answering geometry queries and receiving
//! repaint, overlay and scroll requests.

use gridshift_core::{Axis, Rect};

use crate::index::GridIndex;
use crate::proxy::ProxySnapshot;

/// Rest-position geometry of the grid, in viewport (screen) coordinates.
pub trait GridGeometry {
    /// Rest rectangle of the slot at `index`, ignoring gap offsets.
    ///
    /// Hosts may also answer for the one-past-the-end slot of a group,
    /// which is used when a gap opens at the tail. `None` means the slot is
    /// unknown or not laid out.
    fn slot_rect(&self, index: GridIndex) -> Option<Rect>;

    /// Drop zone for creating a new group, when the host renders one.
    fn new_group_rect(&self) -> Option<Rect> {
        None
    }
}

/// A snapshot of the scroll state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub position: f32,
    pub min_extent: f32,
    pub max_extent: f32,
    /// Visible region in the same coordinates as slot rectangles.
    pub viewport: Rect,
    pub axis: Axis,
}

impl ScrollMetrics {
    #[must_use]
    pub fn at_min(&self) -> bool {
        self.position <= self.min_extent
    }

    #[must_use]
    pub fn at_max(&self) -> bool {
        self.position >= self.max_extent
    }

    /// Clamp `position` into the scroll extent.
    #[must_use]
    pub fn clamp(&self, position: f32) -> f32 {
        position.clamp(self.min_extent, self.max_extent.max(self.min_extent))
    }
}

/// A viewport the coordinator may scroll while dragging.
pub trait Scrollable {
    fn metrics(&self) -> ScrollMetrics;

    /// Move the scroll position immediately.
    fn jump_to(&mut self, position: f32);
}

/// Repaint granularity requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repaint {
    /// One cell changed its dragging flag.
    Item(GridIndex),
    /// The overlay proxy moved or re-decorated.
    Proxy,
    /// Gap offsets changed for several cells.
    Grid,
}

/// Everything the coordinator needs from the embedding view.
pub trait ReorderHost: GridGeometry {
    /// The enclosing scrollable, if any. Without one autoscroll is off.
    fn scrollable(&mut self) -> Option<&mut dyn Scrollable>;

    /// Show the floating proxy in the overlay layer.
    fn open_proxy(&mut self, _proxy: &ProxySnapshot) {}

    /// Remove the floating proxy.
    fn close_proxy(&mut self) {}

    fn request_repaint(&mut self, _what: Repaint) {}
}
