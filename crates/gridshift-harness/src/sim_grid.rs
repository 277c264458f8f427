#![forbid(unsafe_code)]

//! Simulated grid host.
//!
//! [`SimGrid`] lays groups out top to bottom in a vertically scrolling
//! viewport. Each group wraps its cells into rows of `columns` fixed-size
//! cells, followed by `group_gap` pixels of spacing. An optional
//! "new group" drop zone one row tall sits after the last group.
//!
//! Everything the coordinator asks of the host is recorded as a
//! [`HostEvent`], and the log can be dumped as JSONL:
//!
//! ```json
//! {"event":"mounted","group":0,"item":0}
//! {"event":"proxy_opened","group":0,"item":0,"x":0.0,"y":0.0}
//! {"event":"jump","position":2.0}
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use gridshift::{
    GridGeometry, GridIndex, GridShape, HandleId, ProxySnapshot, ReorderCoordinator,
    ReorderEffect, ReorderHost, Repaint, ScrollMetrics, Scrollable,
};
use gridshift_core::{Axis, Point, Rect, Size};
use serde::Serialize;

/// One recorded host interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Mounted {
        group: usize,
        item: usize,
    },
    Unmounted {
        group: usize,
        item: usize,
    },
    RepaintItem {
        group: usize,
        item: usize,
    },
    RepaintProxy,
    RepaintGrid,
    ProxyOpened {
        group: usize,
        item: usize,
        x: f32,
        y: f32,
    },
    ProxyClosed,
    Jump {
        position: f32,
    },
}

/// Deterministic fixed-cell grid with a scrollable viewport.
#[derive(Debug, Clone)]
pub struct SimGrid {
    shape: GridShape,
    columns: usize,
    cell: Size,
    group_gap: f32,
    new_group_zone: bool,
    viewport: Rect,
    scroll: f32,
    mounted: BTreeMap<GridIndex, HandleId>,
    events: Vec<HostEvent>,
}

impl SimGrid {
    /// A grid of `columns` cells per row inside `viewport`.
    #[must_use]
    pub fn new(shape: impl Into<GridShape>, columns: usize, cell: Size, viewport: Rect) -> Self {
        Self {
            shape: shape.into(),
            columns: columns.max(1),
            cell,
            group_gap: 0.0,
            new_group_zone: true,
            viewport,
            scroll: 0.0,
            mounted: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_group_gap(mut self, gap: f32) -> Self {
        self.group_gap = gap.max(0.0);
        self
    }

    #[must_use]
    pub fn with_new_group_zone(mut self, enabled: bool) -> Self {
        self.new_group_zone = enabled;
        self
    }

    #[must_use]
    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    /// Replace the shape. Mounts are left alone until the next
    /// [`SimGrid::sync_mounts`].
    pub fn set_shape(&mut self, shape: impl Into<GridShape>) {
        self.shape = shape.into();
    }

    #[must_use]
    pub const fn scroll_position(&self) -> f32 {
        self.scroll
    }

    pub fn set_scroll(&mut self, position: f32) {
        self.scroll = position.clamp(0.0, self.max_scroll());
    }

    /// Largest scroll position that still fills the viewport.
    #[must_use]
    pub fn max_scroll(&self) -> f32 {
        (self.content_height() - self.viewport.height).max(0.0)
    }

    #[must_use]
    pub fn content_height(&self) -> f32 {
        let zone = if self.new_group_zone {
            self.cell.height
        } else {
            0.0
        };
        self.group_top(self.shape.group_count()) + zone
    }

    /// Centre of the slot at `index` on screen.
    #[must_use]
    pub fn cell_center(&self, index: GridIndex) -> Option<Point> {
        self.slot_rect(index).map(|rect| rect.center())
    }

    /// Centre of the new-group drop zone on screen.
    #[must_use]
    pub fn new_group_center(&self) -> Option<Point> {
        self.new_group_rect().map(|rect| rect.center())
    }

    #[must_use]
    pub fn is_visible(&self, index: GridIndex) -> bool {
        self.shape.contains(index)
            && self
                .slot_rect(index)
                .is_some_and(|rect| rect.intersects(&self.viewport))
    }

    #[must_use]
    pub fn mounted(&self) -> &BTreeMap<GridIndex, HandleId> {
        &self.mounted
    }

    // -----------------------------------------------------------------------
    // Mount bookkeeping
    // -----------------------------------------------------------------------

    /// Register every cell of the shape, visible or not.
    pub fn mount_all(&mut self, coordinator: &mut ReorderCoordinator) {
        let indices: Vec<GridIndex> = self.shape.indices().collect();
        for index in indices {
            self.mount(index, coordinator);
        }
    }

    /// Mount cells that scrolled into view and unmount those that left.
    pub fn sync_mounts(&mut self, coordinator: &mut ReorderCoordinator) {
        let visible: BTreeSet<GridIndex> = self
            .shape
            .indices()
            .filter(|&index| self.is_visible(index))
            .collect();
        let stale: Vec<(GridIndex, HandleId)> = self
            .mounted
            .iter()
            .filter(|(index, _)| !visible.contains(*index))
            .map(|(&index, &id)| (index, id))
            .collect();
        for (index, id) in stale {
            coordinator.unregister_item(index, id);
            self.mounted.remove(&index);
            self.events.push(HostEvent::Unmounted {
                group: index.group,
                item: index.item,
            });
        }
        for index in visible {
            if !self.mounted.contains_key(&index) {
                self.mount(index, coordinator);
            }
        }
    }

    fn mount(&mut self, index: GridIndex, coordinator: &mut ReorderCoordinator) {
        let id = coordinator.register_item(index, self);
        self.mounted.insert(index, id);
        self.events.push(HostEvent::Mounted {
            group: index.group,
            item: index.item,
        });
        tracing::trace!(target: "gridshift.harness", %index, %id, "cell mounted");
    }

    // -----------------------------------------------------------------------
    // Frame driving
    // -----------------------------------------------------------------------

    /// Tick until no animation needs another frame, keeping mounts in sync
    /// with the scroll position. Stops after `max_frames`.
    pub fn run_frames(
        &mut self,
        coordinator: &mut ReorderCoordinator,
        dt: Duration,
        max_frames: usize,
    ) -> Vec<ReorderEffect> {
        let mut effects = Vec::new();
        for _ in 0..max_frames {
            let outcome = coordinator.tick(dt, self);
            self.sync_mounts(coordinator);
            effects.extend(outcome.effect);
            if !outcome.needs_frame {
                break;
            }
        }
        effects
    }

    // -----------------------------------------------------------------------
    // Event log
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Every scroll position written by the coordinator, in order.
    #[must_use]
    pub fn jumps(&self) -> Vec<f32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::Jump { position } => Some(*position),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&HostEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }

    /// The log as JSON lines.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| serde_json::to_string(event).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    fn rows(&self, group: usize) -> usize {
        self.shape.item_count(group).div_ceil(self.columns).max(1)
    }

    /// Content-space top of `group`.
    fn group_top(&self, group: usize) -> f32 {
        (0..group)
            .map(|g| self.rows(g) as f32 * self.cell.height + self.group_gap)
            .sum()
    }

    fn to_screen_y(&self, content_y: f32) -> f32 {
        self.viewport.y + content_y - self.scroll
    }
}

impl GridGeometry for SimGrid {
    fn slot_rect(&self, index: GridIndex) -> Option<Rect> {
        if index.group >= self.shape.group_count()
            || index.item > self.shape.item_count(index.group)
        {
            return None;
        }
        let row = index.item / self.columns;
        let col = index.item % self.columns;
        let top = self.group_top(index.group) + row as f32 * self.cell.height;
        Some(Rect::new(
            self.viewport.x + col as f32 * self.cell.width,
            self.to_screen_y(top),
            self.cell.width,
            self.cell.height,
        ))
    }

    fn new_group_rect(&self) -> Option<Rect> {
        self.new_group_zone.then(|| {
            Rect::new(
                self.viewport.x,
                self.to_screen_y(self.group_top(self.shape.group_count())),
                self.columns as f32 * self.cell.width,
                self.cell.height,
            )
        })
    }
}

impl Scrollable for SimGrid {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            position: self.scroll,
            min_extent: 0.0,
            max_extent: self.max_scroll(),
            viewport: self.viewport,
            axis: Axis::Vertical,
        }
    }

    fn jump_to(&mut self, position: f32) {
        self.events.push(HostEvent::Jump { position });
        self.scroll = position.clamp(0.0, self.max_scroll());
    }
}

impl ReorderHost for SimGrid {
    fn scrollable(&mut self) -> Option<&mut dyn Scrollable> {
        Some(self)
    }

    fn open_proxy(&mut self, proxy: &ProxySnapshot) {
        self.events.push(HostEvent::ProxyOpened {
            group: proxy.index.group,
            item: proxy.index.item,
            x: proxy.rect.x,
            y: proxy.rect.y,
        });
    }

    fn close_proxy(&mut self) {
        self.events.push(HostEvent::ProxyClosed);
    }

    fn request_repaint(&mut self, what: Repaint) {
        self.events.push(match what {
            Repaint::Item(index) => HostEvent::RepaintItem {
                group: index.group,
                item: index.item,
            },
            Repaint::Proxy => HostEvent::RepaintProxy,
            Repaint::Grid => HostEvent::RepaintGrid,
        });
    }
}
