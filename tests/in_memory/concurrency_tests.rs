//! Racing writers against the optimistic and guarded commits.

use super::helpers::{Harness, caller, harness, payload};
use rstest::rstest;
use tasktree::{
    api::ErrorKind,
    task::{
        domain::{TaskStatus, UserId},
        ports::TaskRepository,
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_assignments_never_lose_an_update(harness: Harness) -> eyre::Result<()> {
    let task = harness.api.create(payload("contended", None), caller()).await?;

    let mut handles = Vec::new();
    for user in 1..=16_i64 {
        let api = harness.api.clone();
        handles.push(tokio::spawn(async move {
            api.assign(task.id, UserId::new(user)).await
        }));
    }

    let mut applied = 0_u64;
    for handle in handles {
        match handle.await? {
            Ok(_) => applied += 1,
            Err(err) => eyre::ensure!(err.kind() == ErrorKind::Conflict, "unexpected {err:?}"),
        }
    }

    let stored = harness
        .tasks
        .find_by_id(task.id)
        .await?
        .ok_or_else(|| eyre::eyre!("task vanished"))?;
    eyre::ensure!(applied >= 1, "at least one writer must win");
    eyre::ensure!(stored.version() == 1 + applied, "every applied write bumps the version once");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn close_racing_child_creation_keeps_the_tree_consistent() -> eyre::Result<()> {
    for _ in 0..25 {
        let harness = harness();
        let parent = harness.api.create(payload("parent", None), caller()).await?;
        harness.api.set_status(parent.id, "IN_PROGRESS", caller()).await?;
        harness.api.set_status(parent.id, "RESOLVED", caller()).await?;

        let closer = harness.api.clone();
        let creator = harness.api.clone();
        let close = tokio::spawn(async move { closer.set_status(parent.id, "CLOSED", caller()).await });
        let create = tokio::spawn(async move {
            creator.create(payload("late child", Some(parent.id)), caller()).await
        });
        let (closed, created) = (close.await?, create.await?);

        let stored = harness
            .tasks
            .find_by_id(parent.id)
            .await?
            .ok_or_else(|| eyre::eyre!("parent vanished"))?;
        let children = harness.tasks.find_by_parent_id(parent.id).await?;

        if stored.status() == TaskStatus::Closed {
            eyre::ensure!(
                children.iter().all(|child| child.status() == TaskStatus::Closed),
                "closed parent acquired an open child"
            );
            eyre::ensure!(closed.is_ok());
        }
        if created.is_ok() {
            eyre::ensure!(children.len() == 1);
        }
        if let Err(err) = &closed {
            eyre::ensure!(
                matches!(
                    err.kind(),
                    ErrorKind::ParentHasOpenDescendants | ErrorKind::Conflict
                ),
                "unexpected close failure {err:?}"
            );
        }
    }
    Ok(())
}
