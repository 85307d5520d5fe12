//! Error types for task domain validation, lifecycle decisions, and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task description exceeds the configured limit.
    #[error("task description is {length} characters, limit is {max}")]
    DescriptionTooLong {
        /// Character count of the rejected description.
        length: usize,
        /// Configured upper bound.
        max: usize,
    },

    /// The task is closed and can no longer be modified.
    #[error("task {0} is CLOSED and cannot be modified")]
    TaskAlreadyClosed(TaskId),

    /// The requested status is not reachable from the current one.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// Closing was requested while a descendant is still open.
    #[error(
        "task {task_id} cannot be CLOSED until all subtasks are CLOSED \
         (descendant {open_descendant} is {descendant_status})"
    )]
    ParentHasOpenDescendants {
        /// Task that was asked to close.
        task_id: TaskId,
        /// First open descendant found.
        open_descendant: TaskId,
        /// Status of that descendant.
        descendant_status: TaskStatus,
    },
}

/// Error returned while parsing task statuses from requests or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing priority or type values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task {attribute}: {value}")]
pub struct ParseTaskAttributeError {
    /// Attribute being parsed.
    pub attribute: &'static str,
    /// Rejected raw value.
    pub value: String,
}

impl ParseTaskAttributeError {
    pub(crate) fn new(attribute: &'static str, value: &str) -> Self {
        Self {
            attribute,
            value: value.to_owned(),
        }
    }
}
