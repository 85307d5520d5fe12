//! Boundary error classification.

use crate::message::{ports::MessageRepositoryError, services::TaskMessageError};
use crate::task::{
    domain::TaskDomainError, ports::TaskRepositoryError, services::TaskServiceError,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Result type for boundary operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Response status class for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// The referenced resource does not exist.
    NotFound,
    /// The request is malformed or not permitted in the current state.
    BadRequest,
    /// The request raced with a concurrent change.
    Conflict,
    /// The store is unavailable.
    ServiceUnavailable,
}

impl ResponseStatus {
    /// Returns the HTTP status code conventionally used for this class.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::BadRequest => 400,
            Self::Conflict => 409,
            Self::ServiceUnavailable => 503,
        }
    }
}

/// Classification of boundary failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The addressed task does not exist.
    TaskNotFound,
    /// The referenced parent does not exist.
    ParentNotFound,
    /// Input failed validation.
    ValidationError,
    /// A closed task was asked to change.
    TaskAlreadyClosed,
    /// The requested status is not reachable.
    InvalidStatusTransition,
    /// Closing was requested while a descendant is open.
    ParentHasOpenDescendants,
    /// The task or its subtree changed concurrently.
    Conflict,
    /// Infrastructure failure.
    Transient,
}

impl ErrorKind {
    /// Returns the stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::ParentNotFound => "PARENT_NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::TaskAlreadyClosed => "TASK_ALREADY_CLOSED",
            Self::InvalidStatusTransition => "INVALID_STATUS_TRANSITION",
            Self::ParentHasOpenDescendants => "PARENT_HAS_OPEN_DESCENDANTS",
            Self::Conflict => "CONFLICT",
            Self::Transient => "TRANSIENT",
        }
    }

    /// Returns the response status class.
    #[must_use]
    pub const fn status(self) -> ResponseStatus {
        match self {
            Self::TaskNotFound | Self::ParentNotFound => ResponseStatus::NotFound,
            Self::ValidationError
            | Self::TaskAlreadyClosed
            | Self::InvalidStatusTransition
            | Self::ParentHasOpenDescendants => ResponseStatus::BadRequest,
            Self::Conflict => ResponseStatus::Conflict,
            Self::Transient => ResponseStatus::ServiceUnavailable,
        }
    }

    /// Whether the caller may retry the same request unchanged.
    ///
    /// Lifecycle rejections are final for the current state; only races
    /// and infrastructure faults can succeed on retry.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Conflict | Self::Transient)
    }
}

/// A classified boundary error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    /// Creates an error of `kind` with a caller-facing message.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the caller-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Shorthand for [`ErrorKind::is_retryable`].
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Builds the serialisable response body stamped with `timestamp`.
    #[must_use]
    pub fn to_response(&self, timestamp: DateTime<Utc>) -> ErrorResponse {
        ErrorResponse {
            timestamp,
            status: self.kind.status().code(),
            error: self.kind.code(),
            message: self.message.clone(),
        }
    }

    fn from_task_repository(err: &TaskRepositoryError) -> Self {
        let kind = match err {
            TaskRepositoryError::NotFound(_) => ErrorKind::TaskNotFound,
            TaskRepositoryError::ParentMissing(_) => ErrorKind::ParentNotFound,
            TaskRepositoryError::ParentClosed(_) => ErrorKind::TaskAlreadyClosed,
            TaskRepositoryError::DuplicateTask(_)
            | TaskRepositoryError::VersionConflict { .. }
            | TaskRepositoryError::SubtreeChanged { .. } => ErrorKind::Conflict,
            TaskRepositoryError::Persistence(_) => {
                tracing::error!(error = %err, "task store failure");
                ErrorKind::Transient
            }
        };
        Self::new(kind, err.to_string())
    }

    fn from_message_repository(err: &MessageRepositoryError) -> Self {
        let kind = match err {
            MessageRepositoryError::TaskMissing(_) => ErrorKind::TaskNotFound,
            MessageRepositoryError::TaskClosed(_) => ErrorKind::TaskAlreadyClosed,
            MessageRepositoryError::DuplicateMessage(_) => ErrorKind::Conflict,
            MessageRepositoryError::Persistence(_) => {
                tracing::error!(error = %err, "message store failure");
                ErrorKind::Transient
            }
        };
        Self::new(kind, err.to_string())
    }
}

impl From<TaskDomainError> for ApiError {
    fn from(err: TaskDomainError) -> Self {
        let kind = match err {
            TaskDomainError::EmptyTitle | TaskDomainError::DescriptionTooLong { .. } => {
                ErrorKind::ValidationError
            }
            TaskDomainError::TaskAlreadyClosed(_) => ErrorKind::TaskAlreadyClosed,
            TaskDomainError::InvalidStatusTransition { .. } => ErrorKind::InvalidStatusTransition,
            TaskDomainError::ParentHasOpenDescendants { .. } => {
                ErrorKind::ParentHasOpenDescendants
            }
        };
        Self::new(kind, err.to_string())
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::Domain(domain) => Self::from(domain),
            TaskServiceError::TaskNotFound(_) => Self::new(ErrorKind::TaskNotFound, err.to_string()),
            TaskServiceError::ParentNotFound(_) => {
                Self::new(ErrorKind::ParentNotFound, err.to_string())
            }
            TaskServiceError::InvalidStatusName(_) => {
                Self::new(ErrorKind::ValidationError, err.to_string())
            }
            TaskServiceError::Repository(ref store) => Self::from_task_repository(store),
        }
    }
}

impl From<TaskMessageError> for ApiError {
    fn from(err: TaskMessageError) -> Self {
        match err {
            TaskMessageError::TaskNotFound(_) => {
                Self::new(ErrorKind::TaskNotFound, err.to_string())
            }
            TaskMessageError::Task(domain) => Self::from(domain),
            TaskMessageError::Domain(_) => Self::new(ErrorKind::ValidationError, err.to_string()),
            TaskMessageError::TaskRepository(ref store) => Self::from_task_repository(store),
            TaskMessageError::Repository(ref store) => Self::from_message_repository(store),
        }
    }
}

/// Serialisable error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// When the error was produced.
    pub timestamp: DateTime<Utc>,
    /// Numeric response status.
    pub status: u16,
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable detail.
    pub message: String,
}
