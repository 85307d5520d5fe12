//! Error types for message validation.

use thiserror::Error;

/// Errors returned while constructing a task message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageDomainError {
    /// The message text is empty after trimming.
    #[error("message must not be empty")]
    EmptyMessage,

    /// The message text exceeds the configured limit.
    #[error("message is {length} characters, limit is {max}")]
    MessageTooLong {
        /// Character count of the rejected text.
        length: usize,
        /// Configured upper bound.
        max: usize,
    },
}
