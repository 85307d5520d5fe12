//! Facade exposing task and message operations to a transport layer.

use super::{AddMessagePayload, ApiResult, CallerIdentity, CreateTaskPayload};
use crate::config::TaskLimits;
use crate::message::{
    ports::MessageRepository,
    services::{MessageView, TaskMessageService},
};
use crate::task::{
    domain::{TaskId, UserId},
    ports::TaskRepository,
    services::{CreateTaskRequest, TaskService, TaskView},
};
use mockable::Clock;
use std::sync::Arc;

/// Boundary facade over [`TaskService`] and [`TaskMessageService`].
///
/// Mutating operations take the caller explicitly; nothing is read from
/// ambient state.
pub struct TaskApi<T, M, C>
where
    T: TaskRepository,
    M: MessageRepository,
    C: Clock + Send + Sync,
{
    tasks: TaskService<T, C>,
    messages: TaskMessageService<T, M, C>,
}

impl<T, M, C> Clone for TaskApi<T, M, C>
where
    T: TaskRepository,
    M: MessageRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            messages: self.messages.clone(),
        }
    }
}

impl<T, M, C> TaskApi<T, M, C>
where
    T: TaskRepository,
    M: MessageRepository,
    C: Clock + Send + Sync,
{
    /// Wires both services over shared stores and clock.
    #[must_use]
    pub fn new(tasks: Arc<T>, messages: Arc<M>, clock: Arc<C>, limits: TaskLimits) -> Self {
        Self {
            tasks: TaskService::with_limits(Arc::clone(&tasks), Arc::clone(&clock), limits),
            messages: TaskMessageService::with_limits(tasks, messages, clock, limits),
        }
    }

    /// Creates a task owned by `caller`.
    ///
    /// # Errors
    ///
    /// `ValidationError`, `ParentNotFound`, `TaskAlreadyClosed`, or a store
    /// failure.
    pub async fn create(
        &self,
        payload: CreateTaskPayload,
        caller: CallerIdentity,
    ) -> ApiResult<TaskView> {
        let request = CreateTaskRequest::try_from(payload)?;
        Ok(self.tasks.create_task(request, caller.user_id()).await?)
    }

    /// Returns a task with its nested subtree.
    ///
    /// # Errors
    ///
    /// `TaskNotFound` or a store failure.
    pub async fn get(&self, id: TaskId) -> ApiResult<TaskView> {
        Ok(self.tasks.get_task(id).await?)
    }

    /// Lists the direct children of `parent_id`.
    ///
    /// # Errors
    ///
    /// `ParentNotFound` or a store failure.
    pub async fn list_children(&self, parent_id: TaskId) -> ApiResult<Vec<TaskView>> {
        Ok(self.tasks.get_child_tasks(parent_id).await?)
    }

    /// Lists root tasks.
    ///
    /// # Errors
    ///
    /// Store failures only.
    pub async fn list_roots(&self) -> ApiResult<Vec<TaskView>> {
        Ok(self.tasks.get_root_tasks().await?)
    }

    /// Moves a task to the named status.
    ///
    /// # Errors
    ///
    /// `TaskNotFound`, `ValidationError` for an unknown name,
    /// `TaskAlreadyClosed`, `InvalidStatusTransition`,
    /// `ParentHasOpenDescendants`, `Conflict`, or a store failure.
    pub async fn set_status(
        &self,
        id: TaskId,
        status_name: &str,
        caller: CallerIdentity,
    ) -> ApiResult<TaskView> {
        Ok(self
            .tasks
            .update_status(id, status_name, caller.user_id())
            .await?)
    }

    /// Assigns a task.
    ///
    /// # Errors
    ///
    /// `TaskNotFound`, `TaskAlreadyClosed`, `Conflict`, or a store failure.
    pub async fn assign(&self, id: TaskId, assignee: UserId) -> ApiResult<TaskView> {
        Ok(self.tasks.assign(id, assignee).await?)
    }

    /// Posts a message on a task as `caller`.
    ///
    /// # Errors
    ///
    /// `TaskNotFound`, `TaskAlreadyClosed`, `ValidationError`, or a store
    /// failure.
    pub async fn add_message(
        &self,
        task_id: TaskId,
        payload: AddMessagePayload,
        caller: CallerIdentity,
    ) -> ApiResult<MessageView> {
        Ok(self
            .messages
            .add_message(task_id, &payload.text, caller.user_id())
            .await?)
    }

    /// Lists a task's messages, oldest first.
    ///
    /// # Errors
    ///
    /// `TaskNotFound` or a store failure.
    pub async fn list_messages(&self, task_id: TaskId) -> ApiResult<Vec<MessageView>> {
        Ok(self.messages.list_messages(task_id).await?)
    }
}
