//! Repository port for task persistence and tree lookup.

use crate::task::domain::{SubtreeSnapshot, Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Each call is its own transaction. Reads return a consistent snapshot of
/// the rows they touch; nothing stays locked between calls.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// When the task has a parent, the parent's existence and non-closed
    /// status are verified inside the same write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the identifier
    /// already exists, [`TaskRepositoryError::ParentMissing`] when the parent
    /// does not exist, or [`TaskRepositoryError::ParentClosed`] when the
    /// parent is closed.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists a mutated task.
    ///
    /// The write succeeds only while the stored version is exactly one
    /// behind `task.version()`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::VersionConflict`] when the stored version
    /// moved since the task was loaded.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists a mutated task after re-validating an observed subtree.
    ///
    /// Besides the optimistic check performed by [`TaskRepository::update`],
    /// every descendant in `snapshot` must still carry its recorded version,
    /// and no unrecorded task may have the root or a recorded descendant as
    /// its parent. Validation and write are atomic.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::SubtreeChanged`] when the subtree
    /// drifted, plus the errors of [`TaskRepository::update`].
    async fn update_guarded(
        &self,
        task: &Task,
        snapshot: &SubtreeSnapshot,
    ) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the direct children of `parent_id`, oldest first.
    async fn find_by_parent_id(&self, parent_id: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the direct children of every id in `parent_ids`.
    ///
    /// Used to fetch one tree level per round-trip. The default issues one
    /// [`TaskRepository::find_by_parent_id`] call per parent.
    async fn find_children_of(&self, parent_ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        let mut children = Vec::new();
        for parent_id in parent_ids {
            children.extend(self.find_by_parent_id(*parent_id).await?);
        }
        Ok(children)
    }

    /// Returns every task without a parent, oldest first.
    async fn find_roots(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns `true` when a task with `id` exists.
    async fn exists_by_id(&self, id: TaskId) -> TaskRepositoryResult<bool>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The parent referenced by a new task does not exist.
    #[error("parent task not found: {0}")]
    ParentMissing(TaskId),

    /// The parent referenced by a new task is closed.
    #[error("parent task {0} is CLOSED")]
    ParentClosed(TaskId),

    /// The stored version differs from the one the caller loaded.
    #[error("task {task_id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        /// Task being written.
        task_id: TaskId,
        /// Version the caller based its change on.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// A guarded subtree changed between check and commit.
    #[error("subtree of task {root} changed while it was being closed (at {changed})")]
    SubtreeChanged {
        /// Root of the guarded subtree.
        root: TaskId,
        /// First node found to have drifted.
        changed: TaskId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for concurrency conflicts a caller may retry.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. } | Self::SubtreeChanged { .. })
    }
}
