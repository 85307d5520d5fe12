//! Request payloads and caller identity.

use super::{ApiError, ErrorKind};
use crate::task::{
    domain::{TaskId, TaskPriority, TaskType, UserId},
    services::CreateTaskRequest,
};
use serde::Deserialize;

/// Identity of an authenticated caller, supplied by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    user_id: UserId,
}

impl CallerIdentity {
    /// Wraps an authenticated user identifier.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Returns the caller's user identifier.
    #[must_use]
    pub const fn user_id(self) -> UserId {
        self.user_id
    }
}

/// Body of a task creation request.
///
/// Priority and type arrive as raw names and are parsed on conversion, so
/// an unknown value is a validation failure rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    /// Title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Priority name, for example `HIGH`.
    pub priority: String,
    /// Type name, for example `BUG`.
    #[serde(rename = "type")]
    pub task_type: String,
    /// Parent task, if the new task is a subtask.
    #[serde(default)]
    pub parent_id: Option<TaskId>,
}

impl TryFrom<CreateTaskPayload> for CreateTaskRequest {
    type Error = ApiError;

    fn try_from(payload: CreateTaskPayload) -> Result<Self, Self::Error> {
        let priority = TaskPriority::try_from(payload.priority.as_str())
            .map_err(|err| ApiError::new(ErrorKind::ValidationError, err.to_string()))?;
        let task_type = TaskType::try_from(payload.task_type.as_str())
            .map_err(|err| ApiError::new(ErrorKind::ValidationError, err.to_string()))?;

        let mut request =
            Self::new(payload.title, priority, task_type).with_optional_parent(payload.parent_id);
        if let Some(description) = payload.description {
            request = request.with_description(description);
        }
        Ok(request)
    }
}

/// Body of a message post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddMessagePayload {
    /// Message text.
    pub text: String,
}
