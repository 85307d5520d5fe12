//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{LockedNode, NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::config::DatabaseConfig;
use crate::task::{
    domain::{
        PersistedTaskData, SubtreeSnapshot, Task, TaskId, TaskPriority, TaskStatus, TaskType,
        UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool from configuration.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when no URL is configured or
/// the pool cannot establish its initial connections.
pub fn connect_pool(config: &DatabaseConfig) -> TaskRepositoryResult<TaskPgPool> {
    let url = config
        .require_url()
        .map_err(TaskRepositoryError::persistence)?;
    Pool::builder()
        .max_size(config.max_pool_size)
        .build(ConnectionManager::<PgConnection>::new(url))
        .map_err(TaskRepositoryError::persistence)
}

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let parent_id = task.parent_id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                if let Some(parent) = parent_id {
                    // FOR SHARE blocks a concurrent close of the parent until
                    // this insert commits.
                    let parent_status = tasks::table
                        .find(parent.into_inner())
                        .select(tasks::status)
                        .for_share()
                        .first::<String>(tx)
                        .optional()?;
                    match parent_status {
                        None => return Err(TaskRepositoryError::ParentMissing(parent)),
                        Some(status) if status == TaskStatus::Closed.as_str() => {
                            return Err(TaskRepositoryError::ParentClosed(parent));
                        }
                        Some(_) => {}
                    }
                }

                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                            parent_id.map_or_else(
                                || TaskRepositoryError::persistence(err),
                                TaskRepositoryError::ParentMissing,
                            )
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let version = task.version();
        let changeset = to_changeset(task)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                write_versioned(tx, task_id, version, &changeset)
            })
        })
        .await
    }

    async fn update_guarded(
        &self,
        task: &Task,
        snapshot: &SubtreeSnapshot,
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let version = task.version();
        let changeset = to_changeset(task)?;
        let guard = snapshot.clone();

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let parents: Vec<uuid::Uuid> = guard
                    .parents()
                    .into_iter()
                    .map(TaskId::into_inner)
                    .collect();
                // Two statements: the child scan must take its snapshot after
                // the observed rows are locked, otherwise an insert that held
                // the parent FOR SHARE while we waited stays invisible.
                let mut locked = diesel::sql_query(
                    "SELECT id, parent_id, version FROM tasks WHERE id = ANY($1) FOR UPDATE",
                )
                .bind::<diesel::sql_types::Array<diesel::sql_types::Uuid>, _>(parents.clone())
                .load::<LockedNode>(tx)?;
                let children = diesel::sql_query(
                    "SELECT id, parent_id, version FROM tasks WHERE parent_id = ANY($1) FOR UPDATE",
                )
                .bind::<diesel::sql_types::Array<diesel::sql_types::Uuid>, _>(parents)
                .load::<LockedNode>(tx)?;
                locked.extend(children);

                verify_snapshot(&locked, &guard)?;
                write_versioned(tx, task_id, version, &changeset)
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_parent_id(&self, parent_id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::parent_id.eq(parent_id.into_inner()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_children_of(&self, parent_ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<uuid::Uuid> = parent_ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::parent_id.eq_any(ids))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_roots(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::parent_id.is_null())
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn exists_by_id(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let exists = diesel::select(diesel::dsl::exists(
                tasks::table.find(id.into_inner()),
            ))
            .get_result::<bool>(connection)?;
            Ok(exists)
        })
        .await
    }
}

/// Writes `changeset` if the stored version is one behind `version`.
fn write_versioned(
    connection: &mut PgConnection,
    task_id: TaskId,
    version: u64,
    changeset: &TaskChangeset,
) -> TaskRepositoryResult<()> {
    let expected = version.saturating_sub(1);
    let expected_db = to_db_version(expected)?;
    let updated = diesel::update(
        tasks::table
            .filter(tasks::id.eq(task_id.into_inner()))
            .filter(tasks::version.eq(expected_db)),
    )
    .set(changeset)
    .execute(connection)?;

    if updated == 1 {
        return Ok(());
    }

    let actual = tasks::table
        .find(task_id.into_inner())
        .select(tasks::version)
        .first::<i64>(connection)
        .optional()?;
    match actual {
        None => Err(TaskRepositoryError::NotFound(task_id)),
        Some(stored) => Err(TaskRepositoryError::VersionConflict {
            task_id,
            expected,
            actual: from_db_version(stored)?,
        }),
    }
}

/// Compares locked rows against the closure snapshot.
///
/// Every recorded descendant must be present at its recorded version, and
/// every locked row whose parent is an observed node must itself have been
/// observed.
fn verify_snapshot(locked: &[LockedNode], snapshot: &SubtreeSnapshot) -> TaskRepositoryResult<()> {
    let root = snapshot.root();
    for (id, version) in snapshot.descendants() {
        let unchanged = locked.iter().any(|node| {
            node.id == id.into_inner()
                && u64::try_from(node.version).is_ok_and(|stored| stored == version)
        });
        if !unchanged {
            return Err(TaskRepositoryError::SubtreeChanged { root, changed: id });
        }
    }

    let unseen_child = locked.iter().find(|node| {
        let node_id = TaskId::from_uuid(node.id);
        node.parent_id
            .is_some_and(|parent| snapshot.covers(TaskId::from_uuid(parent)))
            && !snapshot.covers(node_id)
    });
    if let Some(node) = unseen_child {
        return Err(TaskRepositoryError::SubtreeChanged {
            root,
            changed: TaskId::from_uuid(node.id),
        });
    }
    Ok(())
}

fn to_db_version(version: u64) -> TaskRepositoryResult<i64> {
    i64::try_from(version).map_err(TaskRepositoryError::persistence)
}

fn from_db_version(version: i64) -> TaskRepositoryResult<u64> {
    u64::try_from(version).map_err(TaskRepositoryError::persistence)
}

fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        parent_id: task.parent_id().map(TaskId::into_inner),
        title: task.title().to_owned(),
        description: task.description().map(ToOwned::to_owned),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        task_type: task.task_type().as_str().to_owned(),
        assigned_to: task.assigned_to().map(UserId::value),
        created_by: task.created_by().value(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        version: to_db_version(task.version())?,
    })
}

fn to_changeset(task: &Task) -> TaskRepositoryResult<TaskChangeset> {
    Ok(TaskChangeset {
        status: task.status().as_str().to_owned(),
        assigned_to: task.assigned_to().map(UserId::value),
        updated_at: task.updated_at(),
        version: to_db_version(task.version())?,
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        parent_id,
        title,
        description,
        status: persisted_status,
        priority: persisted_priority,
        task_type: persisted_type,
        assigned_to,
        created_by,
        created_at,
        updated_at,
        version,
    } = row;

    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let priority = TaskPriority::try_from(persisted_priority.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let task_type =
        TaskType::try_from(persisted_type.as_str()).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        parent_id: parent_id.map(TaskId::from_uuid),
        title,
        description,
        status,
        priority,
        task_type,
        assigned_to: assigned_to.map(UserId::new),
        created_by: UserId::new(created_by),
        created_at,
        updated_at,
        version: from_db_version(version)?,
    }))
}
