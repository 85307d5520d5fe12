//! Service-level error type for task operations.

use crate::task::{
    domain::{ParseTaskStatusError, TaskDomainError, TaskId},
    ports::TaskRepositoryError,
};
use thiserror::Error;

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation or a lifecycle decision rejected the request.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The addressed task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The referenced parent task does not exist.
    #[error("parent task not found: {0}")]
    ParentNotFound(TaskId),

    /// The requested status name is not a known status.
    #[error(transparent)]
    InvalidStatusName(#[from] ParseTaskStatusError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

impl TaskServiceError {
    /// Translates repository errors that carry domain meaning.
    ///
    /// Parent checks enforced inside the store surface exactly like the
    /// service's own pre-checks.
    pub(crate) fn from_store(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::ParentMissing(parent_id) => Self::ParentNotFound(parent_id),
            TaskRepositoryError::ParentClosed(parent_id) => {
                Self::Domain(TaskDomainError::TaskAlreadyClosed(parent_id))
            }
            TaskRepositoryError::NotFound(task_id) => Self::TaskNotFound(task_id),
            other => Self::Repository(other),
        }
    }
}
