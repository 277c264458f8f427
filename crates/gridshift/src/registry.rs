#![forbid(unsafe_code)]

//! Mounted-cell registry with per-item gap animation state.
//!
//! Cells register when they mount and unregister when they unmount. Only
//! mounted cells participate in hit-testing and gap animation; cells scrolled
//! out of the viewport are simply absent.
//!
//! # Invariants
//!
//! 1. At most one handle per index; registering again overwrites it.
//! 2. `unregister` removes a handle only when the caller's [`HandleId`]
//!    matches, so a stale unmount never evicts a newer cell.
//! 3. After [`ItemRegistry::reset_offsets`] every handle reports a zero
//!    displayed and target offset with no tween in flight.
//!
//! # Failure Modes
//!
//! Lookups for unknown indices return `None`. Nothing here panics.

use std::fmt;
use std::time::Duration;

use ahash::AHashMap;
use gridshift_core::animation::{Animation, Tween};
use gridshift_core::{Offset, Rect};
use serde::{Deserialize, Serialize};

use crate::config::GapConfig;
use crate::host::GridGeometry;
use crate::index::GridIndex;
use crate::session::SessionId;

/// Identity of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(u64);

impl HandleId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Gap animation state
// ---------------------------------------------------------------------------

/// Displacement of one cell away from its rest slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapState {
    start: Offset,
    target: Offset,
    tween: Option<Tween>,
}

impl GapState {
    /// Offset currently painted.
    #[must_use]
    pub fn displayed(&self) -> Offset {
        match &self.tween {
            Some(tween) => Offset::lerp(self.start, self.target, tween.value()),
            None => self.target,
        }
    }

    /// Offset the cell is heading to.
    #[must_use]
    pub const fn target(&self) -> Offset {
        self.target
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Move toward `target`. An in-flight animation restarts from the
    /// currently displayed offset. Returns `false` when the target is
    /// unchanged.
    pub fn retarget(&mut self, target: Offset, config: &GapConfig, animate: bool) -> bool {
        if self.target == target {
            return false;
        }
        if animate && !config.duration.is_zero() {
            self.start = self.displayed();
            self.tween = Some(Tween::unit(config.duration, config.easing));
        } else {
            self.start = target;
            self.tween = None;
        }
        self.target = target;
        true
    }

    /// Returns whether the animation is still running.
    fn tick(&mut self, dt: Duration) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return false;
        };
        tween.tick(dt);
        if tween.is_complete() {
            self.start = self.target;
            self.tween = None;
            return false;
        }
        true
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// One mounted cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemHandle {
    id: HandleId,
    index: GridIndex,
    dragging: bool,
    gap: GapState,
}

impl ItemHandle {
    #[must_use]
    pub const fn id(&self) -> HandleId {
        self.id
    }

    #[must_use]
    pub const fn index(&self) -> GridIndex {
        self.index
    }

    /// Whether this cell is the one being dragged (and should render hidden).
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[must_use]
    pub const fn gap(&self) -> &GapState {
        &self.gap
    }

    /// Rest rectangle on screen.
    #[must_use]
    pub fn rect<G: GridGeometry + ?Sized>(&self, geometry: &G) -> Option<Rect> {
        geometry.slot_rect(self.index)
    }

    /// Rest rectangle moved by the target gap offset; used for hit-testing.
    #[must_use]
    pub fn target_rect<G: GridGeometry + ?Sized>(&self, geometry: &G) -> Option<Rect> {
        self.rect(geometry).map(|rect| rect.translate(self.gap.target()))
    }

    /// Rest rectangle moved by the displayed gap offset.
    #[must_use]
    pub fn visual_rect<G: GridGeometry + ?Sized>(&self, geometry: &G) -> Option<Rect> {
        self.rect(geometry).map(|rect| rect.translate(self.gap.displayed()))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Mounted cells keyed by group, then item.
#[derive(Debug, Default)]
pub struct ItemRegistry {
    groups: AHashMap<usize, AHashMap<usize, ItemHandle>>,
    next_id: u64,
}

impl ItemRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a cell at `index`, replacing any previous handle there.
    pub fn register(&mut self, index: GridIndex) -> HandleId {
        self.next_id += 1;
        let id = HandleId(self.next_id);
        self.groups.entry(index.group).or_default().insert(
            index.item,
            ItemHandle {
                id,
                index,
                dragging: false,
                gap: GapState::default(),
            },
        );
        id
    }

    /// Unmount the cell at `index` if it is still registration `id`.
    pub fn unregister(&mut self, index: GridIndex, id: HandleId) -> bool {
        let Some(group) = self.groups.get_mut(&index.group) else {
            return false;
        };
        if group.get(&index.item).is_none_or(|handle| handle.id != id) {
            return false;
        }
        group.remove(&index.item);
        if group.is_empty() {
            self.groups.remove(&index.group);
        }
        true
    }

    #[must_use]
    pub fn lookup(&self, index: GridIndex) -> Option<&ItemHandle> {
        self.groups.get(&index.group)?.get(&index.item)
    }

    #[must_use]
    pub fn contains(&self, index: GridIndex) -> bool {
        self.lookup(index).is_some()
    }

    /// Number of mounted cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(|group| group.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Mounted indices in group-major order.
    #[must_use]
    pub fn indices(&self) -> Vec<GridIndex> {
        let mut indices: Vec<GridIndex> = self
            .groups
            .values()
            .flat_map(|group| group.values().map(|handle| handle.index))
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Set the dragging flag. Returns `true` if the handle exists and the
    /// flag changed.
    pub fn set_dragging(&mut self, index: GridIndex, dragging: bool) -> bool {
        match self.lookup_mut(index) {
            Some(handle) if handle.dragging != dragging => {
                handle.dragging = dragging;
                true
            }
            _ => false,
        }
    }

    /// Point the handle at `index` toward a new gap offset.
    pub fn set_target(
        &mut self,
        index: GridIndex,
        target: Offset,
        config: &GapConfig,
        animate: bool,
    ) -> bool {
        self.lookup_mut(index)
            .is_some_and(|handle| handle.gap.retarget(target, config, animate))
    }

    /// Advance every gap animation. Returns whether any is still running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let mut animating = false;
        for handle in self.groups.values_mut().flat_map(|group| group.values_mut()) {
            animating |= handle.gap.tick(dt);
        }
        animating
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.groups
            .values()
            .flat_map(|group| group.values())
            .any(|handle| handle.gap.is_animating())
    }

    /// Zero every offset and discard in-flight tweens.
    pub fn reset_offsets(&mut self) {
        for handle in self.groups.values_mut().flat_map(|group| group.values_mut()) {
            handle.gap.reset();
        }
    }

    fn lookup_mut(&mut self, index: GridIndex) -> Option<&mut ItemHandle> {
        self.groups.get_mut(&index.group)?.get_mut(&index.item)
    }
}

// ---------------------------------------------------------------------------
// Render identity
// ---------------------------------------------------------------------------

/// Compound key matching a rendered cell to its persistent state.
///
/// Includes the session id so a cell remounted mid-drag is not confused
/// with the same content before the drag began.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey<K> {
    pub content: K,
    pub index: GridIndex,
    pub session: Option<SessionId>,
}

impl<K> CellKey<K> {
    #[must_use]
    pub const fn new(content: K, index: GridIndex, session: Option<SessionId>) -> Self {
        Self {
            content,
            index,
            session,
        }
    }
}
