#![forbid(unsafe_code)]

//! Insert-index resolution and gap offsets.
//!
//! Each pass hit-tests the pointer against mounted cells at their *target*
//! positions, picks the insert index, and retargets every mounted cell so a
//! one-slot gap opens where the dragged cell would land.
//!
//! # Invariants
//!
//! 1. The dragged cell never receives an offset and is never hit.
//! 2. Resolving again with the pointer in the same place changes nothing.
//! 3. A pointer over empty space keeps the previous insert index.
//! 4. A displaced cell stands in for the slot it currently occupies, so the
//!    pointer can always return the insert index to the drag origin.
//!
//! # Shift rule
//!
//! Same group as the drag: cells between the origin and the insert index
//! (inclusive) move one slot toward the origin. Another group: cells of the
//! insert group at or after the insert index move one slot forward. All
//! other cells rest at zero.

use gridshift_core::{Axis, Offset, Point, Rect, Size};

use crate::config::GapConfig;
use crate::host::GridGeometry;
use crate::index::GridIndex;
use crate::registry::ItemRegistry;
use crate::shape::GridShape;

/// Result of one resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapOutcome {
    Unchanged,
    Changed {
        previous: GridIndex,
        insert: GridIndex,
        /// Cells whose target offset changed.
        retargeted: usize,
    },
}

impl GapOutcome {
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Inputs describing the drag for a resolution pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapQuery {
    pub dragged: GridIndex,
    pub insert: GridIndex,
    pub pointer: Point,
    pub item_size: Size,
    /// Axis cells advance along inside a group.
    pub flow_axis: Axis,
}

/// Stateless resolver; the insert index lives on the session and offsets
/// live in the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapResolver {
    config: GapConfig,
    allow_new_group: bool,
}

impl GapResolver {
    #[must_use]
    pub const fn new(config: GapConfig, allow_new_group: bool) -> Self {
        Self {
            config,
            allow_new_group,
        }
    }

    /// Slot shift for the cell at `index` given the drag origin and insert
    /// index.
    #[must_use]
    pub fn shift(index: GridIndex, dragged: GridIndex, insert: GridIndex) -> isize {
        if index == dragged {
            return 0;
        }
        if insert.group == dragged.group {
            if index.group != dragged.group {
                return 0;
            }
            let lo = dragged.item.min(insert.item);
            let hi = dragged.item.max(insert.item);
            if index.item < lo || index.item > hi {
                return 0;
            }
            return match insert.item.cmp(&dragged.item) {
                std::cmp::Ordering::Greater => -1,
                std::cmp::Ordering::Less => 1,
                std::cmp::Ordering::Equal => 0,
            };
        }
        if index.group == insert.group && index.item >= insert.item {
            1
        } else {
            0
        }
    }

    /// Index under `query.pointer`, or `None` when the pointer is over
    /// empty space.
    #[must_use]
    pub fn hit_test<G: GridGeometry + ?Sized>(
        &self,
        query: &GapQuery,
        registry: &ItemRegistry,
        geometry: &G,
        shape: &GridShape,
    ) -> Option<GridIndex> {
        if self.allow_new_group
            && geometry
                .new_group_rect()
                .is_some_and(|rect| rect.contains(query.pointer))
        {
            return Some(shape.new_group_index());
        }
        registry
            .indices()
            .into_iter()
            .filter(|&index| index != query.dragged)
            .find(|&index| {
                registry
                    .lookup(index)
                    .and_then(|handle| handle.target_rect(geometry))
                    .is_some_and(|rect| rect.contains(query.pointer))
            })
            .map(|index| {
                let shift = Self::shift(index, query.dragged, query.insert);
                index.with_item(index.item.saturating_add_signed(shift))
            })
    }

    /// Resolve the insert index and retarget offsets if it moved.
    ///
    /// `insert` is updated in place.
    pub fn resolve<G: GridGeometry + ?Sized>(
        &self,
        query: &GapQuery,
        insert: &mut GridIndex,
        registry: &mut ItemRegistry,
        geometry: &G,
        shape: &GridShape,
        animate: bool,
    ) -> GapOutcome {
        let Some(hit) = self.hit_test(query, registry, geometry, shape) else {
            return GapOutcome::Unchanged;
        };
        if hit == *insert {
            return GapOutcome::Unchanged;
        }
        let previous = *insert;
        *insert = hit;
        let retargeted = self.apply(
            &GapQuery {
                insert: hit,
                ..*query
            },
            registry,
            geometry,
            animate,
        );
        tracing::trace!(
            target: "gridshift.gap",
            %previous,
            insert = %hit,
            retargeted,
            "insert index changed"
        );
        GapOutcome::Changed {
            previous,
            insert: hit,
            retargeted,
        }
    }

    /// Place every mounted cell for `query.insert` without animating.
    pub fn seed<G: GridGeometry + ?Sized>(
        &self,
        query: &GapQuery,
        registry: &mut ItemRegistry,
        geometry: &G,
    ) -> usize {
        self.apply(query, registry, geometry, false)
    }

    /// Target offset for one cell.
    #[must_use]
    pub fn target_offset<G: GridGeometry + ?Sized>(
        index: GridIndex,
        query: &GapQuery,
        geometry: &G,
    ) -> Offset {
        let shift = Self::shift(index, query.dragged, query.insert);
        if shift == 0 {
            return Offset::ZERO;
        }
        slot_step(index, shift, query, geometry)
    }

    /// Where the proxy's top-left should settle on release.
    ///
    /// `None` when the host cannot place the target; callers settle in place.
    #[must_use]
    pub fn drop_position<G: GridGeometry + ?Sized>(
        &self,
        query: &GapQuery,
        geometry: &G,
        shape: &GridShape,
    ) -> Option<Point> {
        let insert = query.insert;
        if shape.is_new_group(insert) {
            let rect = geometry.new_group_rect()?;
            return Some(rect.center() - query.item_size.half());
        }
        let count = shape.item_count(insert.group);
        if insert.item + 1 < count {
            return geometry.slot_rect(insert).map(|rect| rect.origin());
        }
        // Last slot, or one past it when appending from another group: the
        // empty slot after the preceding cell.
        match insert.item.checked_sub(1) {
            Some(item) if item < count => {
                let before = insert.with_item(item);
                let rect = geometry.slot_rect(before)?;
                let step = slot_step(before, 1, query, geometry);
                Some(rect.center().translate(step) - query.item_size.half())
            }
            _ => geometry.slot_rect(insert).map(|rect| rect.origin()),
        }
    }

    fn apply<G: GridGeometry + ?Sized>(
        &self,
        query: &GapQuery,
        registry: &mut ItemRegistry,
        geometry: &G,
        animate: bool,
    ) -> usize {
        let mut retargeted = 0;
        for index in registry.indices() {
            let target = Self::target_offset(index, query, geometry);
            if registry.set_target(index, target, &self.config, animate) {
                retargeted += 1;
            }
        }
        retargeted
    }
}

/// Vector from the rest slot of `index` to the slot `shift` positions away.
///
/// Falls back to the item size along the flow axis when either slot is
/// unknown to the host.
fn slot_step<G: GridGeometry + ?Sized>(
    index: GridIndex,
    shift: isize,
    query: &GapQuery,
    geometry: &G,
) -> Offset {
    let neighbour = index
        .item
        .checked_add_signed(shift)
        .map(|item| index.with_item(item));
    let rects: Option<(Rect, Rect)> = neighbour
        .and_then(|neighbour| Some((geometry.slot_rect(index)?, geometry.slot_rect(neighbour)?)));
    match rects {
        Some((from, to)) => to.origin() - from.origin(),
        None => Offset::from_axis(
            query.flow_axis,
            shift as f32 * query.item_size.along(query.flow_axis),
        ),
    }
}
