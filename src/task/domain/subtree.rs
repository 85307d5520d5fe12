//! Versioned record of a subtree observed by the descendant-closure check.

use super::{Task, TaskId};
use std::collections::BTreeMap;

/// The descendants a closure check read, each with the version it saw.
///
/// Stores use the snapshot to guard the commit that closes `root`: the
/// commit must fail when any recorded descendant changed version or when a
/// child that was not observed now hangs under the root or a recorded
/// descendant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeSnapshot {
    root: TaskId,
    descendants: BTreeMap<TaskId, u64>,
}

impl SubtreeSnapshot {
    /// Starts an empty snapshot for `root`.
    #[must_use]
    pub const fn new(root: TaskId) -> Self {
        Self {
            root,
            descendants: BTreeMap::new(),
        }
    }

    /// Records a descendant at the version it was read with.
    pub fn record(&mut self, task: &Task) {
        self.descendants.insert(task.id(), task.version());
    }

    /// Returns the snapshot root.
    #[must_use]
    pub const fn root(&self) -> TaskId {
        self.root
    }

    /// Returns the recorded version of `id`, if it was observed.
    #[must_use]
    pub fn version_of(&self, id: TaskId) -> Option<u64> {
        self.descendants.get(&id).copied()
    }

    /// Iterates the recorded descendants with their versions.
    pub fn descendants(&self) -> impl Iterator<Item = (TaskId, u64)> + '_ {
        self.descendants.iter().map(|(id, version)| (*id, *version))
    }

    /// Returns every node whose children were enumerated: the root plus
    /// each recorded descendant.
    #[must_use]
    pub fn parents(&self) -> Vec<TaskId> {
        std::iter::once(self.root)
            .chain(self.descendants.keys().copied())
            .collect()
    }

    /// Returns `true` when `id` is the root or a recorded descendant.
    #[must_use]
    pub fn covers(&self, id: TaskId) -> bool {
        id == self.root || self.descendants.contains_key(&id)
    }

    /// Number of recorded descendants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descendants.len()
    }

    /// Returns `true` when no descendant was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descendants.is_empty()
    }
}
