//! Diesel row models for task messages.

use super::schema::task_messages;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task messages.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    /// Message identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Message text.
    pub body: String,
    /// Posting user.
    pub sender_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for task messages. `seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_messages)]
pub struct NewMessageRow {
    /// Message identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Message text.
    pub body: String,
    /// Posting user.
    pub sender_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Status of the owning task, read under a share lock.
#[derive(Debug, Clone, QueryableByName)]
pub struct OwningTaskStatus {
    /// Stored status name.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub status: String,
}
