//! Message posting and listing through the boundary.

use super::helpers::{Harness, caller, close_from_open, harness, payload};
use rstest::rstest;
use tasktree::{
    api::{AddMessagePayload, ErrorKind},
    task::domain::{TaskId, UserId},
};

fn text(body: &str) -> AddMessagePayload {
    AddMessagePayload {
        text: body.to_owned(),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn messages_are_listed_oldest_first(harness: Harness) -> eyre::Result<()> {
    let api = &harness.api;
    let task = api.create(payload("discussed", None), caller()).await?;

    for body in ["first", "second", "third"] {
        api.add_message(task.id, text(body), caller()).await?;
    }
    let listed = api.list_messages(task.id).await?;

    let bodies: Vec<&str> = listed.iter().map(|message| message.body.as_str()).collect();
    eyre::ensure!(bodies == ["first", "second", "third"], "order: {bodies:?}");
    eyre::ensure!(
        listed
            .windows(2)
            .all(|pair| pair.first().map(|m| m.created_at) <= pair.get(1).map(|m| m.created_at))
    );
    eyre::ensure!(listed.iter().all(|message| message.sender_id == UserId::new(7)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn messages_are_accepted_in_every_open_state(harness: Harness) -> eyre::Result<()> {
    let api = &harness.api;
    let task = api.create(payload("busy", None), caller()).await?;

    for status in ["BLOCKED", "IN_PROGRESS", "RESOLVED"] {
        api.set_status(task.id, status, caller()).await?;
        api.add_message(task.id, text(status), caller()).await?;
    }

    eyre::ensure!(api.list_messages(task.id).await?.len() == 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_task_rejects_messages(harness: Harness) -> eyre::Result<()> {
    let api = &harness.api;
    let task = api.create(payload("finished", None), caller()).await?;
    close_from_open(api, task.id).await?;

    let err = api
        .add_message(task.id, text("too late"), caller())
        .await
        .expect_err("closed task");

    eyre::ensure!(err.kind() == ErrorKind::TaskAlreadyClosed);
    eyre::ensure!(api.list_messages(task.id).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_message_is_a_validation_error(harness: Harness) -> eyre::Result<()> {
    let task = harness.api.create(payload("t", None), caller()).await?;

    let err = harness
        .api
        .add_message(task.id, text("   "), caller())
        .await
        .expect_err("blank text");

    eyre::ensure!(err.kind() == ErrorKind::ValidationError);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn messages_on_missing_tasks_are_not_found(harness: Harness) {
    let missing = TaskId::new();

    let add = harness
        .api
        .add_message(missing, text("hello"), caller())
        .await
        .expect_err("missing task");
    let list = harness
        .api
        .list_messages(missing)
        .await
        .expect_err("missing task");

    assert_eq!(add.kind(), ErrorKind::TaskNotFound);
    assert_eq!(list.kind(), ErrorKind::TaskNotFound);
}
