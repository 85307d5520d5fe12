//! Application services for task messages.

mod error;
mod task_message;

pub use error::{TaskMessageError, TaskMessageResult};
pub use task_message::{MessageView, TaskMessageService};
