//! Posting and listing messages on tasks.

use super::{TaskMessageError, TaskMessageResult};
use crate::config::TaskLimits;
use crate::message::{
    domain::{MessageId, TaskMessage},
    ports::MessageRepository,
};
use crate::task::{
    domain::{Task, TaskId, UserId},
    ports::TaskRepository,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;

/// Response representation of a task message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    /// Message identifier.
    pub id: MessageId,
    /// Owning task.
    pub task_id: TaskId,
    /// Message text.
    pub body: String,
    /// Posting user.
    pub sender_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&TaskMessage> for MessageView {
    fn from(message: &TaskMessage) -> Self {
        Self {
            id: message.id(),
            task_id: message.task_id(),
            body: message.body().to_owned(),
            sender_id: message.sender_id(),
            created_at: message.created_at(),
        }
    }
}

/// Attaches messages to tasks.
///
/// The open-task check here fails fast; the message store repeats it
/// atomically with the write, so a close landing in between is caught
/// there.
pub struct TaskMessageService<T, M, C>
where
    T: TaskRepository,
    M: MessageRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    messages: Arc<M>,
    clock: Arc<C>,
    limits: TaskLimits,
}

impl<T, M, C> Clone for TaskMessageService<T, M, C>
where
    T: TaskRepository,
    M: MessageRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            messages: Arc::clone(&self.messages),
            clock: Arc::clone(&self.clock),
            limits: self.limits,
        }
    }
}

impl<T, M, C> TaskMessageService<T, M, C>
where
    T: TaskRepository,
    M: MessageRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with default limits.
    #[must_use]
    pub fn new(tasks: Arc<T>, messages: Arc<M>, clock: Arc<C>) -> Self {
        Self::with_limits(tasks, messages, clock, TaskLimits::default())
    }

    /// Creates a service with explicit limits.
    #[must_use]
    pub const fn with_limits(
        tasks: Arc<T>,
        messages: Arc<M>,
        clock: Arc<C>,
        limits: TaskLimits,
    ) -> Self {
        Self {
            tasks,
            messages,
            clock,
            limits,
        }
    }

    /// Posts `text` on a task as `sender`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskMessageError::TaskNotFound`] for a missing task,
    /// [`TaskMessageError::Task`] when the task is closed,
    /// [`TaskMessageError::Domain`] for blank or oversized text, and
    /// repository errors.
    #[tracing::instrument(skip(self, text))]
    pub async fn add_message(
        &self,
        task_id: TaskId,
        text: &str,
        sender: UserId,
    ) -> TaskMessageResult<MessageView> {
        let task = self.load(task_id).await?;
        task.ensure_not_closed().inspect_err(|err| {
            tracing::warn!(task_id = %task_id, error = %err, "message rejected");
        })?;

        let message = TaskMessage::new(
            task_id,
            text,
            sender,
            self.limits.max_message_len,
            &*self.clock,
        )?;
        self.messages
            .append(&message)
            .await
            .map_err(TaskMessageError::from_store)?;

        tracing::info!(task_id = %task_id, message_id = %message.id(), sender = %sender, "message added");
        Ok(MessageView::from(&message))
    }

    /// Lists a task's messages, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskMessageError::TaskNotFound`] for a missing task and
    /// repository errors.
    #[tracing::instrument(skip(self))]
    pub async fn list_messages(&self, task_id: TaskId) -> TaskMessageResult<Vec<MessageView>> {
        if !self.tasks.exists_by_id(task_id).await? {
            return Err(TaskMessageError::TaskNotFound(task_id));
        }
        let messages = self.messages.find_by_task_id(task_id).await?;
        tracing::debug!(task_id = %task_id, count = messages.len(), "messages listed");
        Ok(messages.iter().map(MessageView::from).collect())
    }

    async fn load(&self, task_id: TaskId) -> TaskMessageResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskMessageError::TaskNotFound(task_id))
    }
}
