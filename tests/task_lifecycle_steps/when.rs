//! When steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use rstest_bdd_macros::when;
use tasktree::{
    api::{AddMessagePayload, CallerIdentity, CreateTaskPayload},
    task::domain::{TaskId, UserId},
};

fn scenario_caller() -> CallerIdentity {
    CallerIdentity::new(UserId::new(1))
}

#[when(r#"task "{name}" is moved to "{status}""#)]
fn move_task(world: &mut LifecycleWorld, name: String, status: String) -> Result<(), eyre::Report> {
    let id = world.id_of(&name)?;
    let result = run_async(world.api.set_status(id, &status, scenario_caller()));
    world.record(result);
    Ok(())
}

#[when(r#"task "{name}" is assigned to user {user:i64}"#)]
fn assign_task(world: &mut LifecycleWorld, name: String, user: i64) -> Result<(), eyre::Report> {
    let id = world.id_of(&name)?;
    let result = run_async(world.api.assign(id, UserId::new(user)));
    world.record(result);
    Ok(())
}

#[when(r#"a task "{title}" is created under a missing parent"#)]
fn create_under_missing_parent(world: &mut LifecycleWorld, title: String) {
    let missing = TaskId::new();
    world.missing_parent = Some(missing);
    let payload = CreateTaskPayload {
        title,
        description: None,
        priority: "HIGH".to_owned(),
        task_type: "BUG".to_owned(),
        parent_id: Some(missing),
    };
    let result = run_async(world.api.create(payload, scenario_caller()));
    world.record(result);
}

#[when(r#"user {user:i64} posts "{body}" on task "{name}""#)]
fn post_message(
    world: &mut LifecycleWorld,
    user: i64,
    body: String,
    name: String,
) -> Result<(), eyre::Report> {
    let id = world.id_of(&name)?;
    let result = run_async(world.api.add_message(
        id,
        AddMessagePayload { text: body },
        CallerIdentity::new(UserId::new(user)),
    ));
    world.record(result);
    Ok(())
}
