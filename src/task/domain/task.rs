//! Task aggregate root.

use super::{TaskDomainError, TaskId, TaskPriority, TaskStatus, TaskType, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Caller-supplied fields for a new task.
///
/// Status, timestamps, and version are never caller-selectable; they are
/// fixed by [`Task::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Parent task, or `None` for a root task.
    pub parent_id: Option<TaskId>,
    /// Required title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Priority classification.
    pub priority: TaskPriority,
    /// Work classification.
    pub task_type: TaskType,
    /// Identity of the creating user.
    pub created_by: UserId,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    parent_id: Option<TaskId>,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    task_type: TaskType,
    assigned_to: Option<UserId>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted parent reference.
    pub parent_id: Option<TaskId>,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted work classification.
    pub task_type: TaskType,
    /// Persisted assignee.
    pub assigned_to: Option<UserId>,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted optimistic-concurrency version.
    pub version: u64,
}

impl Task {
    /// Version assigned to every freshly created task.
    pub const INITIAL_VERSION: u64 = 1;

    /// Creates a new task in [`TaskStatus::Open`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank, or
    /// [`TaskDomainError::DescriptionTooLong`] when the description exceeds
    /// `max_description_len` characters.
    pub fn new(
        new_task: NewTask,
        max_description_len: usize,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let NewTask {
            parent_id,
            title,
            description,
            priority,
            task_type,
            created_by,
        } = new_task;

        let trimmed_title = title.trim();
        if trimmed_title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }

        let normalized_description = description.filter(|text| !text.trim().is_empty());
        if let Some(text) = normalized_description.as_deref() {
            let length = text.chars().count();
            if length > max_description_len {
                return Err(TaskDomainError::DescriptionTooLong {
                    length,
                    max: max_description_len,
                });
            }
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            parent_id,
            title: trimmed_title.to_owned(),
            description: normalized_description,
            status: TaskStatus::Open,
            priority,
            task_type,
            assigned_to: None,
            created_by,
            created_at: timestamp,
            updated_at: timestamp,
            version: Self::INITIAL_VERSION,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            parent_id: data.parent_id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            task_type: data.task_type,
            assigned_to: data.assigned_to,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
            version: data.version,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the parent task identifier, if any.
    #[must_use]
    pub const fn parent_id(&self) -> Option<TaskId> {
        self.parent_id
    }

    /// Returns `true` when the task has no parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the work classification.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the current assignee, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the optimistic-concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns `true` when the task has reached the terminal status.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Rejects any mutation of a closed task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskAlreadyClosed`] when the task is
    /// closed.
    pub const fn ensure_not_closed(&self) -> Result<(), TaskDomainError> {
        if self.is_closed() {
            return Err(TaskDomainError::TaskAlreadyClosed(self.id));
        }
        Ok(())
    }

    /// Validates a status change against the transition table.
    ///
    /// The closed check runs first and supersedes the table lookup.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskAlreadyClosed`] for closed tasks and
    /// [`TaskDomainError::InvalidStatusTransition`] for edges missing from
    /// the table.
    pub fn check_transition(&self, target: TaskStatus) -> Result<(), TaskDomainError> {
        self.ensure_not_closed()?;
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        Ok(())
    }

    /// Sets the assignee, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskAlreadyClosed`] when the task is
    /// closed.
    pub fn assign_to(&mut self, user_id: UserId, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_not_closed()?;
        self.assigned_to = Some(user_id);
        self.touch(clock);
        Ok(())
    }

    /// Applies a status already approved by the lifecycle engine.
    pub(crate) fn apply_status(&mut self, target: TaskStatus, clock: &impl Clock) {
        self.status = target;
        self.touch(clock);
    }

    /// Stamps `updated_at` and bumps the version.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
        self.version = self.version.saturating_add(1);
    }
}
