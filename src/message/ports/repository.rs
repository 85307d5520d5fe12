//! Repository port for task message persistence.

use crate::message::domain::{MessageId, TaskMessage};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for message repository operations.
pub type MessageRepositoryResult<T> = Result<T, MessageRepositoryError>;

/// Append-only message storage.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Appends a message.
    ///
    /// Stores that share a transaction scope with task rows re-check that
    /// the owning task exists and is open as part of the write.
    ///
    /// # Errors
    ///
    /// Returns [`MessageRepositoryError::DuplicateMessage`] when the
    /// identifier exists, and [`MessageRepositoryError::TaskMissing`] or
    /// [`MessageRepositoryError::TaskClosed`] from stores that re-check the
    /// owning task.
    async fn append(&self, message: &TaskMessage) -> MessageRepositoryResult<()>;

    /// Returns the messages of `task_id` in ascending creation order.
    /// Messages created at the same instant keep insertion order.
    async fn find_by_task_id(&self, task_id: TaskId) -> MessageRepositoryResult<Vec<TaskMessage>>;
}

/// Errors returned by message repository implementations.
#[derive(Debug, Clone, Error)]
pub enum MessageRepositoryError {
    /// A message with the same identifier already exists.
    #[error("duplicate message identifier: {0}")]
    DuplicateMessage(MessageId),

    /// The owning task does not exist.
    #[error("task not found: {0}")]
    TaskMissing(TaskId),

    /// The owning task is closed.
    #[error("task {0} is CLOSED")]
    TaskClosed(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MessageRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
