//! Inbox capacity enforcement across the in-memory stack.

use super::helpers::{Stack, stack};
use rstest::rstest;
use tasker::config::LifecycleConfig;
use tasker::error::ErrorKind;
use tasker::task::{
    domain::TaskStage,
    services::{AddTaskRequest, MoveToStagingRequest, SplitTaskRequest, TaskLifecycleError},
};
use tasker::user::domain::UserId;

async fn fill_inbox(stack: &Stack, owner: &UserId, count: usize) -> eyre::Result<()> {
    for index in 0..count {
        stack.add(owner, &format!("Task {index}")).await?;
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sixth_task_is_rejected_at_default_capacity(stack: Stack) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    fill_inbox(&stack, &owner, 5).await?;

    let result = stack.add(&owner, "One too many").await;

    let err = result
        .err()
        .ok_or_else(|| eyre::eyre!("sixth task should be rejected"))?;
    let lifecycle_err = err
        .downcast_ref::<TaskLifecycleError>()
        .ok_or_else(|| eyre::eyre!("unexpected error {err}"))?;
    eyre::ensure!(
        matches!(
            lifecycle_err,
            TaskLifecycleError::CapacityExceeded { capacity: 5, .. }
        ),
        "expected CapacityExceeded, got {lifecycle_err}"
    );
    let inbox = stack
        .lifecycle
        .list_tasks_by_user(&owner, Some(TaskStage::Inbox))
        .await?;
    eyre::ensure!(inbox.len() == 5, "inbox should still hold five tasks");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn staging_a_task_frees_inbox_room(stack: Stack) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    fill_inbox(&stack, &owner, 5).await?;
    let inbox = stack
        .lifecycle
        .list_tasks_by_user(&owner, Some(TaskStage::Inbox))
        .await?;
    let first = inbox
        .first()
        .ok_or_else(|| eyre::eyre!("inbox should not be empty"))?;

    stack
        .lifecycle
        .move_to_staging(MoveToStagingRequest::new(first.id().clone()).with_location(["desk"]))
        .await?;
    let admitted = stack.add(&owner, "Now it fits").await?;

    eyre::ensure!(admitted.stage() == TaskStage::Inbox, "new task should be in the inbox");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inboxes_are_counted_per_user(stack: Stack) -> Result<(), eyre::Report> {
    let alice = stack.user("Alice").await?;
    let bob = stack.user("Bob").await?;
    fill_inbox(&stack, &alice, 5).await?;

    stack.add(&bob, "Unaffected").await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn capacity_comes_from_toml_configuration() -> Result<(), eyre::Report> {
    let config = LifecycleConfig::from_toml_str("max_inbox_size = 2")?;
    let stack = Stack::new(config);
    let owner = stack.user("Alice").await?;
    fill_inbox(&stack, &owner, 2).await?;

    let err = stack
        .lifecycle
        .add_task(AddTaskRequest::new(owner, "Third"))
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("third task should be rejected"))?;

    eyre::ensure!(err.kind() == ErrorKind::CapacityExceeded, "unexpected error {err}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn splitting_an_inbox_task_respects_capacity() -> Result<(), eyre::Report> {
    let stack = Stack::new(LifecycleConfig::with_max_inbox_size(3));
    let owner = stack.user("Alice").await?;
    let original = stack.add(&owner, "Big").await?;
    stack.add(&owner, "Other").await?;

    let result = stack
        .lifecycle
        .split_task(SplitTaskRequest::new(
            original.id().clone(),
            vec!["A".to_owned(), "B".to_owned(), "C".to_owned()],
            vec![String::new(), String::new(), String::new()],
        ))
        .await;

    eyre::ensure!(
        matches!(result, Err(TaskLifecycleError::CapacityExceeded { .. })),
        "expected CapacityExceeded, got {result:?}"
    );
    eyre::ensure!(
        stack.lifecycle.get_task(original.id()).await.is_ok(),
        "original should survive a rejected split"
    );
    Ok(())
}
