//! `PostgreSQL` implementation of the [`MessageRepository`] port.

use super::{
    models::{MessageRow, NewMessageRow, OwningTaskStatus},
    schema::task_messages,
};
use crate::message::{
    domain::{MessageId, PersistedMessageData, TaskMessage},
    ports::{MessageRepository, MessageRepositoryError, MessageRepositoryResult},
};
use crate::task::adapters::postgres::TaskPgPool;
use crate::task::domain::{TaskId, TaskStatus, UserId};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed message repository.
///
/// Shares the task pool so the owning-task check and the insert run in one
/// transaction.
#[derive(Debug, Clone)]
pub struct PostgresMessageRepository {
    pool: TaskPgPool,
}

impl PostgresMessageRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> MessageRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MessageRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(MessageRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(MessageRepositoryError::persistence)?
    }
}

impl From<DieselError> for MessageRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn append(&self, message: &TaskMessage) -> MessageRepositoryResult<()> {
        let message_id = message.id();
        let task_id = message.task_id();
        let row = to_new_row(message);

        self.run_blocking(move |connection| {
            connection.transaction::<_, MessageRepositoryError, _>(|tx| {
                // Holds off a concurrent close until the message commits.
                let owner = diesel::sql_query("SELECT status FROM tasks WHERE id = $1 FOR SHARE")
                    .bind::<diesel::sql_types::Uuid, _>(task_id.into_inner())
                    .get_result::<OwningTaskStatus>(tx)
                    .optional()?;
                match owner {
                    None => return Err(MessageRepositoryError::TaskMissing(task_id)),
                    Some(owner) if owner.status == TaskStatus::Closed.as_str() => {
                        return Err(MessageRepositoryError::TaskClosed(task_id));
                    }
                    Some(_) => {}
                }

                diesel::insert_into(task_messages::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            MessageRepositoryError::DuplicateMessage(message_id)
                        }
                        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                            MessageRepositoryError::TaskMissing(task_id)
                        }
                        _ => MessageRepositoryError::persistence(err),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_task_id(&self, task_id: TaskId) -> MessageRepositoryResult<Vec<TaskMessage>> {
        self.run_blocking(move |connection| {
            let rows = task_messages::table
                .filter(task_messages::task_id.eq(task_id.into_inner()))
                .order((task_messages::created_at.asc(), task_messages::seq.asc()))
                .select(MessageRow::as_select())
                .load::<MessageRow>(connection)?;
            Ok(rows.into_iter().map(row_to_message).collect())
        })
        .await
    }
}

fn to_new_row(message: &TaskMessage) -> NewMessageRow {
    NewMessageRow {
        id: message.id().into_inner(),
        task_id: message.task_id().into_inner(),
        body: message.body().to_owned(),
        sender_id: message.sender_id().value(),
        created_at: message.created_at(),
    }
}

fn row_to_message(row: MessageRow) -> TaskMessage {
    TaskMessage::from_persisted(PersistedMessageData {
        id: MessageId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        body: row.body,
        sender_id: UserId::new(row.sender_id),
        created_at: row.created_at,
    })
}
