//! Hierarchical tasks and their lifecycle.
//!
//! A task moves along a fixed status table and may only be closed once
//! every descendant is closed. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
