//! Service-level error type for message operations.

use crate::message::{domain::MessageDomainError, ports::MessageRepositoryError};
use crate::task::{
    domain::{TaskDomainError, TaskId},
    ports::TaskRepositoryError,
};
use thiserror::Error;

/// Errors returned by [`super::TaskMessageService`].
#[derive(Debug, Error)]
pub enum TaskMessageError {
    /// The addressed task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The owning task rejected the message.
    #[error(transparent)]
    Task(#[from] TaskDomainError),

    /// The message text failed validation.
    #[error(transparent)]
    Domain(#[from] MessageDomainError),

    /// Task lookup failed.
    #[error(transparent)]
    TaskRepository(#[from] TaskRepositoryError),

    /// Message storage failed.
    #[error(transparent)]
    Repository(#[from] MessageRepositoryError),
}

/// Result type for message service operations.
pub type TaskMessageResult<T> = Result<T, TaskMessageError>;

impl TaskMessageError {
    /// Maps store-side owner checks onto the service's own outcomes.
    pub(crate) fn from_store(err: MessageRepositoryError) -> Self {
        match err {
            MessageRepositoryError::TaskMissing(task_id) => Self::TaskNotFound(task_id),
            MessageRepositoryError::TaskClosed(task_id) => {
                Self::Task(TaskDomainError::TaskAlreadyClosed(task_id))
            }
            other => Self::Repository(other),
        }
    }
}
