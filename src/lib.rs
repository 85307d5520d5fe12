//! Tasktree: hierarchical task tracking with a guarded lifecycle.
//!
//! Tasks nest to any depth through a parent reference. Every status change
//! passes through a fixed transition table, and a task may only close once
//! its whole subtree is closed. That check and the final write are guarded
//! against concurrent changes to the subtree.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`task`]: Task records, the lifecycle engine, and the task service
//! - [`message`]: Messages attached to tasks
//! - [`api`]: Protocol-agnostic boundary and error classification
//! - [`config`]: TOML configuration with environment overrides
//! - [`telemetry`]: `tracing` subscriber installation

pub mod api;
pub mod config;
pub mod message;
pub mod task;
pub mod telemetry;
