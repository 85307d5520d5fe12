//! Boundary tests covering every operation and its error classification.

use super::helpers::{Harness, caller, close_from_open, harness, payload};
use rstest::rstest;
use tasktree::{
    api::{CreateTaskPayload, ErrorKind, ResponseStatus},
    task::domain::{TaskId, TaskStatus, UserId},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_then_get_returns_nested_children(harness: Harness) -> eyre::Result<()> {
    let api = &harness.api;
    let root = api.create(payload("root", None), caller()).await?;
    let child = api.create(payload("child", Some(root.id)), caller()).await?;
    let grandchild = api.create(payload("grandchild", Some(child.id)), caller()).await?;

    let tree = api.get(root.id).await?;

    let nested = tree
        .children
        .first()
        .and_then(|view| view.children.first())
        .map(|view| view.id);
    eyre::ensure!(nested == Some(grandchild.id), "grandchild not nested under child");
    eyre::ensure!(tree.created_by == UserId::new(7));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn views_serialise_with_camel_case_and_upper_case_enums(
    harness: Harness,
) -> eyre::Result<()> {
    let created = harness.api.create(payload("wire", None), caller()).await?;

    let json = serde_json::to_value(&created)?;

    eyre::ensure!(json.get("status") == Some(&serde_json::json!("OPEN")));
    eyre::ensure!(json.get("type") == Some(&serde_json::json!("FEATURE")));
    eyre::ensure!(json.get("createdBy") == Some(&serde_json::json!(7)));
    eyre::ensure!(json.get("parentId") == Some(&serde_json::Value::Null));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn payload_decodes_from_camel_case_json(harness: Harness) -> eyre::Result<()> {
    let parent = harness.api.create(payload("parent", None), caller()).await?;
    let body = serde_json::json!({
        "title": "decoded",
        "priority": "critical",
        "type": "bug",
        "parentId": parent.id,
    });
    let decoded: CreateTaskPayload = serde_json::from_value(body)?;

    let created = harness.api.create(decoded, caller()).await?;

    eyre::ensure!(created.parent_id == Some(parent.id));
    Ok(())
}

#[rstest]
#[case("", "MEDIUM", "FEATURE")]
#[case("title", "URGENT", "FEATURE")]
#[case("title", "LOW", "EPIC")]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_creation_is_a_validation_error(
    harness: Harness,
    #[case] title: &str,
    #[case] priority: &str,
    #[case] task_type: &str,
) {
    let request = CreateTaskPayload {
        title: title.to_owned(),
        description: None,
        priority: priority.to_owned(),
        task_type: task_type.to_owned(),
        parent_id: None,
    };

    let err = harness
        .api
        .create(request, caller())
        .await
        .expect_err("invalid payload");

    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(err.kind().status(), ResponseStatus::BadRequest);
    assert!(!err.is_retryable());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_ids_map_to_not_found(harness: Harness) {
    let missing = TaskId::new();
    let api = &harness.api;

    let parent = api
        .create(payload("orphan", Some(missing)), caller())
        .await
        .expect_err("missing parent");
    let get = api.get(missing).await.expect_err("missing task");
    let children = api.list_children(missing).await.expect_err("missing parent");
    let status = api
        .set_status(missing, "IN_PROGRESS", caller())
        .await
        .expect_err("missing task");
    let assign = api
        .assign(missing, UserId::new(1))
        .await
        .expect_err("missing task");

    assert_eq!(parent.kind(), ErrorKind::ParentNotFound);
    assert_eq!(get.kind(), ErrorKind::TaskNotFound);
    assert_eq!(children.kind(), ErrorKind::ParentNotFound);
    assert_eq!(status.kind(), ErrorKind::TaskNotFound);
    assert_eq!(assign.kind(), ErrorKind::TaskNotFound);
    for err in [parent, get, children, status, assign] {
        assert_eq!(err.kind().status(), ResponseStatus::NotFound);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_transition_message_names_both_states(harness: Harness) -> eyre::Result<()> {
    let task = harness.api.create(payload("t", None), caller()).await?;

    let err = harness
        .api
        .set_status(task.id, "RESOLVED", caller())
        .await
        .expect_err("OPEN cannot jump to RESOLVED");

    eyre::ensure!(err.kind() == ErrorKind::InvalidStatusTransition);
    eyre::ensure!(err.message().contains("OPEN"), "message: {}", err.message());
    eyre::ensure!(err.message().contains("RESOLVED"), "message: {}", err.message());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_status_name_is_a_validation_error(harness: Harness) -> eyre::Result<()> {
    let task = harness.api.create(payload("t", None), caller()).await?;

    let err = harness
        .api
        .set_status(task.id, "ARCHIVED", caller())
        .await
        .expect_err("unknown status");

    eyre::ensure!(err.kind() == ErrorKind::ValidationError);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closing_with_open_child_is_rejected_then_allowed(harness: Harness) -> eyre::Result<()> {
    let api = &harness.api;
    let parent = api.create(payload("parent", None), caller()).await?;
    let child = api.create(payload("child", Some(parent.id)), caller()).await?;
    api.set_status(parent.id, "IN_PROGRESS", caller()).await?;
    api.set_status(parent.id, "RESOLVED", caller()).await?;

    let err = api
        .set_status(parent.id, "CLOSED", caller())
        .await
        .expect_err("child still open");
    eyre::ensure!(err.kind() == ErrorKind::ParentHasOpenDescendants);

    close_from_open(api, child.id).await?;
    let closed = api.set_status(parent.id, "CLOSED", caller()).await?;
    eyre::ensure!(closed.status == TaskStatus::Closed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_tasks_refuse_every_mutation(harness: Harness) -> eyre::Result<()> {
    let api = &harness.api;
    let task = api.create(payload("done", None), caller()).await?;
    close_from_open(api, task.id).await?;

    let status = api
        .set_status(task.id, "IN_PROGRESS", caller())
        .await
        .expect_err("closed");
    let assign = api.assign(task.id, UserId::new(2)).await.expect_err("closed");
    let child = api
        .create(payload("late", Some(task.id)), caller())
        .await
        .expect_err("closed parent");

    for err in [status, assign, child] {
        eyre::ensure!(err.kind() == ErrorKind::TaskAlreadyClosed, "got {err:?}");
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assign_overwrites_without_touching_status(harness: Harness) -> eyre::Result<()> {
    let api = &harness.api;
    let task = api.create(payload("t", None), caller()).await?;

    let first = api.assign(task.id, UserId::new(42)).await?;
    let second = api.assign(task.id, UserId::new(99)).await?;

    eyre::ensure!(first.assigned_to == Some(UserId::new(42)));
    eyre::ensure!(second.assigned_to == Some(UserId::new(99)));
    eyre::ensure!(second.status == TaskStatus::Open);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn roots_list_only_top_level_tasks(harness: Harness) -> eyre::Result<()> {
    let api = &harness.api;
    let first = api.create(payload("a", None), caller()).await?;
    api.create(payload("a.1", Some(first.id)), caller()).await?;
    let second = api.create(payload("b", None), caller()).await?;

    let roots = api.list_roots().await?;

    let ids: Vec<TaskId> = roots.iter().map(|view| view.id).collect();
    eyre::ensure!(ids == vec![first.id, second.id], "roots: {ids:?}");
    eyre::ensure!(roots.iter().all(|view| view.children.is_empty()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn error_response_body_is_stable(harness: Harness) -> eyre::Result<()> {
    let err = harness
        .api
        .get(TaskId::new())
        .await
        .expect_err("missing task");

    let body = serde_json::to_value(err.to_response(chrono::Utc::now()))?;

    eyre::ensure!(body.get("status") == Some(&serde_json::json!(404)));
    eyre::ensure!(body.get("error") == Some(&serde_json::json!("TASK_NOT_FOUND")));
    eyre::ensure!(body.get("timestamp").is_some());
    Ok(())
}
