//! Task orchestration service: creation, lookup, status changes, and
//! assignment.

use super::{
    StatusChange, TaskLifecycleEngine, TaskServiceError, TaskServiceResult, TaskView,
};
use crate::config::TaskLimits;
use crate::task::{
    domain::{NewTask, Task, TaskDomainError, TaskId, TaskPriority, TaskStatus, TaskType, UserId},
    ports::TaskRepository,
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    priority: TaskPriority,
    task_type: TaskType,
    parent_id: Option<TaskId>,
}

impl CreateTaskRequest {
    /// Creates a request for a root task with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, priority: TaskPriority, task_type: TaskType) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority,
            task_type,
            parent_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Nests the new task under `parent_id`.
    #[must_use]
    pub const fn with_parent(mut self, parent_id: TaskId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Sets or clears the parent.
    #[must_use]
    pub const fn with_optional_parent(mut self, parent_id: Option<TaskId>) -> Self {
        self.parent_id = parent_id;
        self
    }
}

/// Orchestrates task operations over a repository.
///
/// Every public operation is one unit of work against the store: reads,
/// then at most one write.
pub struct TaskService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    engine: TaskLifecycleEngine<R, C>,
    limits: TaskLimits,
}

impl<R, C> Clone for TaskService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            engine: self.engine.clone(),
            limits: self.limits,
        }
    }
}

impl<R, C> TaskService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with default limits.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_limits(repository, clock, TaskLimits::default())
    }

    /// Creates a service with explicit limits.
    #[must_use]
    pub fn with_limits(repository: Arc<R>, clock: Arc<C>, limits: TaskLimits) -> Self {
        let engine = TaskLifecycleEngine::new(Arc::clone(&repository), Arc::clone(&clock));
        Self {
            repository,
            clock,
            engine,
            limits,
        }
    }

    /// Creates a task in [`TaskStatus::Open`] attributed to `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ParentNotFound`] when the parent is
    /// missing, [`TaskDomainError::TaskAlreadyClosed`] when it is closed,
    /// domain validation errors for a blank title or oversized description,
    /// and repository errors.
    #[tracing::instrument(skip(self, request), fields(parent_id = ?request.parent_id))]
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
        caller: UserId,
    ) -> TaskServiceResult<TaskView> {
        let CreateTaskRequest {
            title,
            description,
            priority,
            task_type,
            parent_id,
        } = request;

        if let Some(parent) = parent_id {
            let parent_task = self
                .repository
                .find_by_id(parent)
                .await?
                .ok_or(TaskServiceError::ParentNotFound(parent))?;
            parent_task.ensure_not_closed()?;
        }

        let task = Task::new(
            NewTask {
                parent_id,
                title,
                description,
                priority,
                task_type,
                created_by: caller,
            },
            self.limits.max_description_len,
            &*self.clock,
        )?;

        self.repository
            .store(&task)
            .await
            .map_err(TaskServiceError::from_store)?;
        tracing::info!(task_id = %task.id(), created_by = %caller, "task created");
        Ok(TaskView::from(&task))
    }

    /// Returns a task with its full subtree attached.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when the task is missing.
    #[tracing::instrument(skip(self))]
    pub async fn get_task(&self, id: TaskId) -> TaskServiceResult<TaskView> {
        let root = self.load(id).await?;
        let mut ordered = vec![root];
        let mut visited = HashSet::from([id]);
        let mut frontier = vec![id];

        while !frontier.is_empty() {
            let children = self.repository.find_children_of(&frontier).await?;
            frontier = Vec::with_capacity(children.len());
            for child in children {
                if visited.insert(child.id()) {
                    frontier.push(child.id());
                    ordered.push(child);
                }
            }
        }

        tracing::debug!(task_id = %id, subtree_size = ordered.len(), "task tree loaded");
        TaskView::assemble(&ordered).ok_or(TaskServiceError::TaskNotFound(id))
    }

    /// Lists the direct children of `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ParentNotFound`] when the parent is
    /// missing.
    #[tracing::instrument(skip(self))]
    pub async fn get_child_tasks(&self, parent_id: TaskId) -> TaskServiceResult<Vec<TaskView>> {
        if !self.repository.exists_by_id(parent_id).await? {
            return Err(TaskServiceError::ParentNotFound(parent_id));
        }
        let children = self.repository.find_by_parent_id(parent_id).await?;
        Ok(children.iter().map(TaskView::from).collect())
    }

    /// Lists every root task.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    #[tracing::instrument(skip(self))]
    pub async fn get_root_tasks(&self) -> TaskServiceResult<Vec<TaskView>> {
        let roots = self.repository.find_roots().await?;
        Ok(roots.iter().map(TaskView::from).collect())
    }

    /// Changes a task's status by name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`],
    /// [`TaskServiceError::InvalidStatusName`], lifecycle rejections as
    /// [`TaskServiceError::Domain`], and repository errors including
    /// concurrency conflicts.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        task_id: TaskId,
        status_name: &str,
        caller: UserId,
    ) -> TaskServiceResult<TaskView> {
        let mut task = self.load(task_id).await?;
        let target = TaskStatus::try_from(status_name)?;
        let previous = task.status();

        let change = self
            .engine
            .change_status(&mut task, target)
            .await
            .inspect_err(|err| {
                tracing::warn!(task_id = %task_id, from = %previous, to = %target, error = %err, "status change rejected");
            })?;

        let persisted = match change {
            StatusChange::Applied => self.repository.update(&task).await,
            StatusChange::Closed(snapshot) => {
                self.repository.update_guarded(&task, &snapshot).await
            }
        };
        persisted.map_err(TaskServiceError::from_store)?;

        tracing::info!(task_id = %task_id, from = %previous, to = %target, changed_by = %caller, "task status changed");
        Ok(TaskView::from(&task))
    }

    /// Assigns a task to `assignee`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`],
    /// [`TaskDomainError::TaskAlreadyClosed`], and repository errors.
    #[tracing::instrument(skip(self))]
    pub async fn assign(&self, task_id: TaskId, assignee: UserId) -> TaskServiceResult<TaskView> {
        let mut task = self.load(task_id).await?;
        self.engine
            .assign(&mut task, assignee)
            .inspect_err(|err: &TaskDomainError| {
                tracing::warn!(task_id = %task_id, error = %err, "assignment rejected");
            })?;
        self.repository
            .update(&task)
            .await
            .map_err(TaskServiceError::from_store)?;
        tracing::info!(task_id = %task_id, assigned_to = %assignee, "task assigned");
        Ok(TaskView::from(&task))
    }

    async fn load(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))
    }
}
