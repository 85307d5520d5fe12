//! Then steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use rstest_bdd_macros::then;
use tasktree::task::{
    domain::{Task, TaskStatus, UserId},
    ports::TaskRepository,
};

fn stored(world: &LifecycleWorld, name: &str) -> Result<Task, eyre::Report> {
    let id = world.id_of(name)?;
    run_async(world.tasks.find_by_id(id))?
        .ok_or_else(|| eyre::eyre!("task {name} missing from store"))
}

#[then("the request succeeds")]
fn request_succeeds(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        None => Ok(()),
        Some(err) => Err(eyre::eyre!("expected success, got {err:?}")),
    }
}

#[then(r#"the request fails with "{code}""#)]
fn request_fails_with(world: &LifecycleWorld, code: String) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected {code}, but the request succeeded"))?;
    eyre::ensure!(
        err.kind().code() == code,
        "expected {code}, got {} ({})",
        err.kind().code(),
        err.message()
    );
    Ok(())
}

#[then(r#"task "{name}" has status "{status}""#)]
fn task_has_status(world: &LifecycleWorld, name: String, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = stored(world, &name)?;
    eyre::ensure!(
        task.status() == expected,
        "expected {expected}, found {}",
        task.status()
    );
    Ok(())
}

#[then(r#"task "{name}" is now assigned to user {user:i64}"#)]
fn task_assigned_to(world: &LifecycleWorld, name: String, user: i64) -> Result<(), eyre::Report> {
    let task = stored(world, &name)?;
    eyre::ensure!(
        task.assigned_to() == Some(UserId::new(user)),
        "expected assignee {user}, found {:?}",
        task.assigned_to()
    );
    Ok(())
}

#[then("no tasks exist")]
fn no_tasks_exist(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let roots = run_async(world.tasks.find_roots())?;
    eyre::ensure!(roots.is_empty(), "expected no root tasks, found {}", roots.len());
    if let Some(missing) = world.missing_parent {
        let orphans = run_async(world.tasks.find_by_parent_id(missing))?;
        eyre::ensure!(orphans.is_empty(), "expected no orphans, found {}", orphans.len());
    }
    Ok(())
}

#[then(r#"task "{name}" lists messages "{bodies}""#)]
fn task_lists_messages(world: &LifecycleWorld, name: String, bodies: String) -> Result<(), eyre::Report> {
    let id = world.id_of(&name)?;
    let listed = run_async(world.api.list_messages(id))?;
    let actual: Vec<&str> = listed.iter().map(|message| message.body.as_str()).collect();
    let expected: Vec<&str> = bodies.split('|').collect();
    eyre::ensure!(actual == expected, "expected {expected:?}, found {actual:?}");
    Ok(())
}

#[then(r#"task "{name}" lists no messages"#)]
fn task_lists_no_messages(world: &LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let id = world.id_of(&name)?;
    let listed = run_async(world.api.list_messages(id))?;
    eyre::ensure!(listed.is_empty(), "expected no messages, found {}", listed.len());
    Ok(())
}
