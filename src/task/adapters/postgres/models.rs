//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Parent task identifier.
    pub parent_id: Option<uuid::Uuid>,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Priority classification.
    pub priority: String,
    /// Work classification.
    pub task_type: String,
    /// Assigned user.
    pub assigned_to: Option<i64>,
    /// Creating user.
    pub created_by: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency version.
    pub version: i64,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Parent task identifier.
    pub parent_id: Option<uuid::Uuid>,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Priority classification.
    pub priority: String,
    /// Work classification.
    pub task_type: String,
    /// Assigned user.
    pub assigned_to: Option<i64>,
    /// Creating user.
    pub created_by: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency version.
    pub version: i64,
}

/// Changeset for the mutable columns of a task.
///
/// `parent_id`, `created_by`, and `created_at` are absent: they never change
/// after insertion.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Lifecycle status.
    pub status: String,
    /// Assigned user.
    pub assigned_to: Option<i64>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency version.
    pub version: i64,
}

/// Identifier, parent, and version of a row locked by a guarded commit.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct LockedNode {
    /// Task identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub id: uuid::Uuid,
    /// Parent task identifier.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Uuid>)]
    pub parent_id: Option<uuid::Uuid>,
    /// Stored version.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub version: i64,
}
