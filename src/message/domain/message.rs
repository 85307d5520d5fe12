//! Task message entity.

use super::{MessageDomainError, MessageId};
use crate::task::domain::{TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A comment posted on a task. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMessage {
    id: MessageId,
    task_id: TaskId,
    body: String,
    sender_id: UserId,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMessageData {
    /// Persisted identifier.
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

impl TaskMessage {
    /// Creates a message stamped with the current clock time.
    ///
    /// # Errors
    ///
    /// Returns [`MessageDomainError::EmptyMessage`] for blank text and
    /// [`MessageDomainError::MessageTooLong`] when the text exceeds
    /// `max_len` characters.
    pub fn new(
        task_id: TaskId,
        body: impl Into<String>,
        sender_id: UserId,
        max_len: usize,
        clock: &impl Clock,
    ) -> Result<Self, MessageDomainError> {
        let raw = body.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MessageDomainError::EmptyMessage);
        }
        let length = trimmed.chars().count();
        if length > max_len {
            return Err(MessageDomainError::MessageTooLong {
                length,
                max: max_len,
            });
        }

        Ok(Self {
            id: MessageId::new(),
            task_id,
            body: trimmed.to_owned(),
            sender_id,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a message from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMessageData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            body: data.body,
            sender_id: data.sender_id,
            created_at: data.created_at,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the message text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the posting user.
    #[must_use]
    pub const fn sender_id(&self) -> UserId {
        self.sender_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
