//! Given steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use chrono::Utc;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use tasktree::{
    api::{CallerIdentity, CreateTaskPayload},
    task::domain::{
        PersistedTaskData, Task, TaskId, TaskPriority, TaskStatus, TaskType, UserId,
    },
};

/// Seeds a task directly into the store, bypassing lifecycle checks so a
/// scenario can start from any tree shape.
fn seed(
    world: &mut LifecycleWorld,
    name: String,
    status: &str,
    parent_id: Option<TaskId>,
) -> Result<(), eyre::Report> {
    let parsed = TaskStatus::try_from(status)
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let now = Utc::now();
    let task = Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        parent_id,
        title: name.clone(),
        description: None,
        status: parsed,
        priority: TaskPriority::Medium,
        task_type: TaskType::Feature,
        assigned_to: None,
        created_by: UserId::new(1),
        created_at: now,
        updated_at: now,
        version: Task::INITIAL_VERSION,
    });
    world.named.insert(name, task.id());
    world
        .tasks
        .insert_unchecked(task)
        .wrap_err("seed scenario task")?;
    Ok(())
}

#[given(r#"an open task "{name}""#)]
fn open_task(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let payload = CreateTaskPayload {
        title: name.clone(),
        description: None,
        priority: "LOW".to_owned(),
        task_type: "CHORE".to_owned(),
        parent_id: None,
    };
    let created = run_async(
        world
            .api
            .create(payload, CallerIdentity::new(UserId::new(1))),
    )
    .wrap_err("create open task for scenario")?;
    world.named.insert(name, created.id);
    Ok(())
}

#[given(r#"a "{status}" task "{name}""#)]
fn task_with_status(
    world: &mut LifecycleWorld,
    status: String,
    name: String,
) -> Result<(), eyre::Report> {
    seed(world, name, &status, None)
}

#[given(r#"a "{status}" child "{name}" of "{parent}""#)]
fn child_with_status(
    world: &mut LifecycleWorld,
    status: String,
    name: String,
    parent: String,
) -> Result<(), eyre::Report> {
    let parent_id = world.id_of(&parent)?;
    seed(world, name, &status, Some(parent_id))
}
