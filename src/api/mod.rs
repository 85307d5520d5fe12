//! Protocol-agnostic boundary over the task and message services.
//!
//! A transport layer (HTTP, RPC, CLI) authenticates the caller, decodes
//! the request into the payload types here, and calls [`TaskApi`]. Every
//! failure arrives as an [`ApiError`] whose [`ErrorKind`] selects the
//! response status; [`ErrorResponse`] is the serialisable body.

mod error;
mod requests;
mod task_api;

pub use error::{ApiError, ApiResult, ErrorKind, ErrorResponse, ResponseStatus};
pub use requests::{AddMessagePayload, CallerIdentity, CreateTaskPayload};
pub use task_api::TaskApi;
