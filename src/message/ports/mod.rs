//! Port contracts for task messages.

pub mod repository;

pub use repository::{MessageRepository, MessageRepositoryError, MessageRepositoryResult};
