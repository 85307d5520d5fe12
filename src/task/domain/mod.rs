//! Domain model for hierarchical task lifecycle management.
//!
//! Tasks form a tree through an immutable `parent_id` reference. The domain
//! owns the transition table and the single-task invariants; tree-wide
//! checks that need storage reads live in the services layer.

mod error;
mod ids;
mod status;
mod subtree;
mod task;

pub use error::{ParseTaskAttributeError, ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskId, UserId};
pub use status::{TaskPriority, TaskStatus, TaskType};
pub use subtree::SubtreeSnapshot;
pub use task::{NewTask, PersistedTaskData, Task};
