//! Descendant-closure check over the self-referencing task tree.

use crate::task::{
    domain::{SubtreeSnapshot, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryResult},
};
use std::collections::HashSet;

/// Outcome of scanning the subtree below a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescendantClosure {
    /// Every descendant is closed. Carries what was read so the commit can
    /// be guarded against concurrent drift.
    AllClosed(SubtreeSnapshot),
    /// A descendant is not closed; the scan stopped there.
    OpenDescendant {
        /// First open descendant found.
        id: TaskId,
        /// Its status.
        status: TaskStatus,
    },
}

impl DescendantClosure {
    /// Returns `true` when an open descendant was found.
    #[must_use]
    pub const fn has_open_descendants(&self) -> bool {
        matches!(self, Self::OpenDescendant { .. })
    }
}

/// Scans the descendants of `root` level by level.
///
/// Each level costs one [`TaskRepository::find_children_of`] round-trip.
/// The scan stops at the first non-closed node without issuing further
/// reads. A visited set seeded with `root` keeps a malformed parent cycle
/// from being walked twice.
///
/// # Errors
///
/// Propagates repository read failures.
pub async fn check_descendants<R>(
    repository: &R,
    root: TaskId,
) -> TaskRepositoryResult<DescendantClosure>
where
    R: TaskRepository + ?Sized,
{
    let mut snapshot = SubtreeSnapshot::new(root);
    let mut visited = HashSet::from([root]);
    let mut frontier = vec![root];
    let mut depth = 0_usize;

    while !frontier.is_empty() {
        depth += 1;
        let children = repository.find_children_of(&frontier).await?;
        let mut next_frontier = Vec::with_capacity(children.len());

        for child in children {
            if !visited.insert(child.id()) {
                tracing::warn!(
                    root = %root,
                    task_id = %child.id(),
                    depth,
                    "task revisited during descendant scan; parent links form a cycle"
                );
                continue;
            }
            if !child.is_closed() {
                tracing::debug!(
                    root = %root,
                    open_descendant = %child.id(),
                    status = %child.status(),
                    depth,
                    "open descendant found"
                );
                return Ok(DescendantClosure::OpenDescendant {
                    id: child.id(),
                    status: child.status(),
                });
            }
            snapshot.record(&child);
            next_frontier.push(child.id());
        }

        frontier = next_frontier;
    }

    tracing::debug!(root = %root, scanned = snapshot.len(), depth, "all descendants closed");
    Ok(DescendantClosure::AllClosed(snapshot))
}
