//! Domain model for task messages.

mod error;
mod ids;
mod message;

pub use error::MessageDomainError;
pub use ids::MessageId;
pub use message::{PersistedMessageData, TaskMessage};
