#![forbid(unsafe_code)]

//! Grid shape: the number of items in each group.

use serde::{Deserialize, Serialize};

use crate::index::GridIndex;

/// Ordered group sizes defining the valid index space.
///
/// Valid indices satisfy `group < group_count()` and
/// `item < item_count(group)`. The virtual "new group" target sits at
/// `(group_count(), 0)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridShape {
    groups: Vec<usize>,
}

impl GridShape {
    #[must_use]
    pub fn new(groups: impl Into<Vec<usize>>) -> Self {
        Self {
            groups: groups.into(),
        }
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Items in `group`; zero for groups that do not exist.
    #[must_use]
    pub fn item_count(&self, group: usize) -> usize {
        self.groups.get(group).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.groups.iter().sum()
    }

    #[must_use]
    pub fn groups(&self) -> &[usize] {
        &self.groups
    }

    /// Whether `index` addresses an existing cell.
    #[must_use]
    pub fn contains(&self, index: GridIndex) -> bool {
        index.item < self.item_count(index.group)
    }

    /// The virtual target for dropping into a brand new group.
    #[must_use]
    pub fn new_group_index(&self) -> GridIndex {
        GridIndex::new(self.groups.len(), 0)
    }

    /// Whether `index` lies beyond the last existing group.
    #[must_use]
    pub fn is_new_group(&self, index: GridIndex) -> bool {
        index.group >= self.groups.len()
    }

    /// Index of the last item slot in `group`, if the group is non-empty.
    #[must_use]
    pub fn last_item(&self, group: usize) -> Option<usize> {
        self.item_count(group).checked_sub(1)
    }

    /// Iterate every valid index in group-major order.
    pub fn indices(&self) -> impl Iterator<Item = GridIndex> + '_ {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(group, &count)| (0..count).map(move |item| GridIndex::new(group, item)))
    }
}

impl From<Vec<usize>> for GridShape {
    fn from(groups: Vec<usize>) -> Self {
        Self::new(groups)
    }
}

impl<const N: usize> From<[usize; N]> for GridShape {
    fn from(groups: [usize; N]) -> Self {
        Self::new(groups.to_vec())
    }
}
