//! `PostgreSQL` adapter for task messages.

mod models;
mod repository;
mod schema;

pub use repository::PostgresMessageRepository;
