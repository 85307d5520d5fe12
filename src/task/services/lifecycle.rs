//! Lifecycle engine: status-change and assignment decisions.
//!
//! The engine only reads from the store. Persisting the mutated task is the
//! caller's job, using the [`StatusChange`] it returns to pick a plain or a
//! guarded write.

use super::{
    DescendantClosure, TaskServiceResult,
    closure::check_descendants,
};
use crate::task::{
    domain::{SubtreeSnapshot, Task, TaskDomainError, TaskStatus, UserId},
    ports::TaskRepository,
};
use mockable::Clock;
use std::sync::Arc;

/// How an approved status change must be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    /// A plain optimistic update suffices.
    Applied,
    /// The task was closed; the write must re-validate this subtree.
    Closed(SubtreeSnapshot),
}

/// Decision logic for task status changes and assignment.
pub struct TaskLifecycleEngine<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskLifecycleEngine<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskLifecycleEngine<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates an engine reading through `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Moves `task` to `target` if the lifecycle rules allow it.
    ///
    /// Checks run in order: closed task, transition table, then (for
    /// [`TaskStatus::Closed`] only) the descendant scan. On any failure the
    /// task is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskAlreadyClosed`],
    /// [`TaskDomainError::InvalidStatusTransition`], or
    /// [`TaskDomainError::ParentHasOpenDescendants`] wrapped in
    /// [`super::TaskServiceError::Domain`]; store read failures surface as
    /// [`super::TaskServiceError::Repository`].
    pub async fn change_status(
        &self,
        task: &mut Task,
        target: TaskStatus,
    ) -> TaskServiceResult<StatusChange> {
        task.check_transition(target)?;

        let change = if target == TaskStatus::Closed {
            match check_descendants(&*self.repository, task.id()).await? {
                DescendantClosure::AllClosed(snapshot) => StatusChange::Closed(snapshot),
                DescendantClosure::OpenDescendant { id, status } => {
                    return Err(TaskDomainError::ParentHasOpenDescendants {
                        task_id: task.id(),
                        open_descendant: id,
                        descendant_status: status,
                    }
                    .into());
                }
            }
        } else {
            StatusChange::Applied
        };

        task.apply_status(target, &*self.clock);
        Ok(change)
    }

    /// Assigns `task` to `user_id`, replacing any previous assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskAlreadyClosed`] when the task is
    /// closed.
    pub fn assign(&self, task: &mut Task, user_id: UserId) -> Result<(), TaskDomainError> {
        task.assign_to(user_id, &*self.clock)
    }
}
