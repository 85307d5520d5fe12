//! `PostgreSQL` integration tests for task messages.

use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use tasktree::{
    message::{
        adapters::postgres::PostgresMessageRepository,
        domain::TaskMessage,
        ports::{MessageRepository, MessageRepositoryError},
    },
    task::{
        adapters::postgres::PostgresTaskRepository,
        domain::{NewTask, PersistedTaskData, Task, TaskId, TaskPriority, TaskStatus, TaskType, UserId},
        ports::TaskRepository,
    },
};

use crate::postgres::helpers::{BoxError, TestDatabase, test_runtime};

fn open_task() -> Result<Task, BoxError> {
    Ok(Task::new(
        NewTask {
            parent_id: None,
            title: "chatty".to_owned(),
            description: None,
            priority: TaskPriority::Medium,
            task_type: TaskType::Improvement,
            created_by: UserId::new(1),
        },
        2000,
        &DefaultClock,
    )?)
}

fn message(task_id: TaskId, body: &str) -> Result<TaskMessage, BoxError> {
    Ok(TaskMessage::new(task_id, body, UserId::new(2), 2000, &DefaultClock)?)
}

#[rstest]
fn messages_are_returned_in_append_order(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), BoxError> {
    let db = TestDatabase::create(shared_test_cluster, "message_order")?;
    let pool = db.pool()?;
    let tasks = PostgresTaskRepository::new(pool.clone());
    let messages = PostgresMessageRepository::new(pool);
    let rt = test_runtime()?;
    let task = open_task()?;
    rt.block_on(tasks.store(&task))?;

    let bodies = ["one", "two", "three"];
    for body in bodies {
        rt.block_on(messages.append(&message(task.id(), body)?))?;
    }

    let listed = rt.block_on(messages.find_by_task_id(task.id()))?;
    let actual: Vec<&str> = listed.iter().map(TaskMessage::body).collect();
    assert_eq!(actual, bodies);
    Ok(())
}

#[rstest]
fn append_rechecks_the_owning_task(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), BoxError> {
    let db = TestDatabase::create(shared_test_cluster, "message_owner")?;
    let pool = db.pool()?;
    let tasks = PostgresTaskRepository::new(pool.clone());
    let messages = PostgresMessageRepository::new(pool);
    let rt = test_runtime()?;

    let missing = rt.block_on(messages.append(&message(TaskId::new(), "nobody home")?));
    assert!(matches!(missing, Err(MessageRepositoryError::TaskMissing(_))));

    let task = open_task()?;
    rt.block_on(tasks.store(&task))?;
    let closed = Task::from_persisted(PersistedTaskData {
        id: task.id(),
        parent_id: None,
        title: task.title().to_owned(),
        description: None,
        status: TaskStatus::Closed,
        priority: task.priority(),
        task_type: task.task_type(),
        assigned_to: None,
        created_by: task.created_by(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        version: 2,
    });
    rt.block_on(tasks.update(&closed))?;

    let rejected = rt.block_on(messages.append(&message(task.id(), "too late")?));
    assert!(matches!(rejected, Err(MessageRepositoryError::TaskClosed(id)) if id == task.id()));
    Ok(())
}
