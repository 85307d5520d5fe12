//! Application services for task lifecycle orchestration.

mod closure;
mod error;
mod lifecycle;
mod task_service;
mod view;

pub use closure::{DescendantClosure, check_descendants};
pub use error::{TaskServiceError, TaskServiceResult};
pub use lifecycle::{StatusChange, TaskLifecycleEngine};
pub use task_service::{CreateTaskRequest, TaskService};
pub use view::TaskView;
