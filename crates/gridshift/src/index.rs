#![forbid(unsafe_code)]

//! Grid coordinates and committed moves.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A `(group, item)` coordinate identifying a cell's logical position.
///
/// Ordering is group-major, which is also the order the gap resolver scans
/// mounted cells in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridIndex {
    pub group: usize,
    pub item: usize,
}

impl GridIndex {
    #[inline]
    #[must_use]
    pub const fn new(group: usize, item: usize) -> Self {
        Self { group, item }
    }

    /// Copy with either field replaced.
    #[inline]
    #[must_use]
    pub fn with_changes(self, group: Option<usize>, item: Option<usize>) -> Self {
        Self {
            group: group.unwrap_or(self.group),
            item: item.unwrap_or(self.item),
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_group(self, group: usize) -> Self {
        Self::new(group, self.item)
    }

    #[inline]
    #[must_use]
    pub const fn with_item(self, item: usize) -> Self {
        Self::new(self.group, item)
    }
}

impl fmt::Display for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.group, self.item)
    }
}

impl From<(usize, usize)> for GridIndex {
    fn from((group, item): (usize, usize)) -> Self {
        Self::new(group, item)
    }
}

/// A committed move: the item at `from` ends up at `to`.
///
/// `to` is interpreted after removing the item from `from`, so a same-group
/// move `(0, 0) → (0, 3)` places the item in the fourth slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reorder {
    pub from: GridIndex,
    pub to: GridIndex,
}

impl Reorder {
    #[must_use]
    pub const fn new(from: GridIndex, to: GridIndex) -> Self {
        Self { from, to }
    }

    /// Whether the destination is a group that does not exist yet in
    /// `groups`.
    #[must_use]
    pub fn creates_group<T>(&self, groups: &[Vec<T>]) -> bool {
        self.to.group == groups.len()
    }

    /// Apply the move to nested item vectors.
    ///
    /// Targeting the virtual new group (`to.group == groups.len()`) appends
    /// a group. A group emptied by the move is kept. Returns `false` and
    /// leaves `groups` untouched when either end is out of range.
    pub fn apply<T>(&self, groups: &mut Vec<Vec<T>>) -> bool {
        let Some(source) = groups.get(self.from.group) else {
            return false;
        };
        if self.from.item >= source.len() {
            return false;
        }
        let valid_target = if self.to.group == groups.len() {
            self.to.item == 0
        } else if self.to.group == self.from.group {
            self.to.item < source.len()
        } else {
            groups
                .get(self.to.group)
                .is_some_and(|target| self.to.item <= target.len())
        };
        if !valid_target {
            return false;
        }

        let item = groups[self.from.group].remove(self.from.item);
        if self.to.group == groups.len() {
            groups.push(vec![item]);
        } else {
            groups[self.to.group].insert(self.to.item, item);
        }
        true
    }
}

impl fmt::Display for Reorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
