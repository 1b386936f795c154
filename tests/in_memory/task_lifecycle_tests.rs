//! End-to-end lifecycle scenarios against the in-memory stack.

use super::helpers::{Stack, ensure_edges_symmetric, stack};
use rstest::rstest;
use tasker::error::ErrorKind;
use tasker::task::{
    domain::{Point, TaskStage, TaskStatus},
    services::{MoveToStagingRequest, SplitTaskRequest, TaskLifecycleError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn staging_under_a_destination_gates_start_until_it_completes(
    stack: Stack,
) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    let dependency = stack.add(&owner, "Dep").await?;
    let main = stack.add(&owner, "Main").await?;
    let lifecycle = &stack.lifecycle;

    let staged = lifecycle
        .move_to_staging(
            MoveToStagingRequest::new(main.id().clone()).with_destination(dependency.id().clone()),
        )
        .await?;
    eyre::ensure!(
        staged.inflows().iter().eq([dependency.id()]),
        "expected the destination as sole inflow"
    );

    let blocked = lifecycle.start_task(main.id()).await;
    let Err(TaskLifecycleError::DependencyNotSatisfied { unmet, .. }) = blocked else {
        eyre::bail!("expected DependencyNotSatisfied, got {blocked:?}");
    };
    eyre::ensure!(unmet == vec![dependency.id().clone()], "unexpected unmet list");

    lifecycle
        .move_to_staging(
            MoveToStagingRequest::new(dependency.id().clone()).with_location(["home"]),
        )
        .await?;
    lifecycle.start_task(dependency.id()).await?;
    let archived = lifecycle.complete_task(dependency.id()).await?;
    eyre::ensure!(archived.stage() == TaskStage::Archived, "dependency not archived");

    let started = lifecycle.start_task(main.id()).await?;
    eyre::ensure!(started.stage() == TaskStage::Active, "main task not active");
    eyre::ensure!(
        started.status() == TaskStatus::InProgress,
        "main task not in progress"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stopping_with_all_points_credited_archives_the_task(
    stack: Stack,
) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    let task = stack.add(&owner, "Write report").await?;
    let lifecycle = &stack.lifecycle;
    lifecycle
        .move_to_staging(
            MoveToStagingRequest::new(task.id().clone())
                .with_location(["work"])
                .with_points([Point::new("effort", 3)]),
        )
        .await?;

    lifecycle.start_task(task.id()).await?;
    let partial = lifecycle
        .stop_task(task.id(), vec![Point::new("effort", 2)])
        .await?;
    eyre::ensure!(!partial.is_complete, "two of three points should not complete");
    eyre::ensure!(partial.task.stage() == TaskStage::Staging, "partial stop returns to staging");

    lifecycle.start_task(task.id()).await?;
    let finished = lifecycle
        .stop_task(task.id(), vec![Point::new("effort", 1)])
        .await?;
    eyre::ensure!(finished.is_complete, "remaining point should complete");
    eyre::ensure!(finished.task.stage() == TaskStage::Archived, "complete stop archives");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_keeps_target_identity_and_rewires_neighbours(
    stack: Stack,
) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    let upstream = stack.add(&owner, "Upstream").await?;
    let source = stack.add(&owner, "Source").await?;
    let target = stack.add(&owner, "Target").await?;
    let lifecycle = &stack.lifecycle;
    lifecycle
        .advertise_task(upstream.id(), &[source.id().clone()])
        .await?;

    let merged = lifecycle.merge_tasks(source.id(), target.id()).await?;

    eyre::ensure!(merged.id() == target.id(), "merge must keep the target's ID");
    eyre::ensure!(
        merged.inflows().contains(upstream.id()),
        "target should inherit the source's inflow"
    );
    let missing = lifecycle.get_task(source.id()).await;
    eyre::ensure!(
        matches!(missing, Err(TaskLifecycleError::NotFound(_))),
        "source should be deleted"
    );
    let tasks = lifecycle.list_all_tasks().await?;
    eyre::ensure!(tasks.len() == 2, "expected two tasks after merge");
    ensure_edges_symmetric(&tasks)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_across_locations_is_rejected(stack: Stack) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    let source = stack.add(&owner, "Source").await?;
    let target = stack.add(&owner, "Target").await?;
    stack
        .lifecycle
        .move_to_staging(MoveToStagingRequest::new(source.id().clone()).with_location(["home"]))
        .await?;

    let result = stack.lifecycle.merge_tasks(source.id(), target.id()).await;

    let err = result.err().ok_or_else(|| eyre::eyre!("merge should fail"))?;
    eyre::ensure!(err.kind() == ErrorKind::LocationMismatch, "unexpected error {err}");
    eyre::ensure!(stack.lifecycle.get_task(source.id()).await.is_ok(), "source must survive");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn split_produces_one_task_per_name_and_detaches_the_original(
    stack: Stack,
) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    let upstream = stack.add(&owner, "Upstream").await?;
    let original = stack.add(&owner, "Big job").await?;
    let lifecycle = &stack.lifecycle;
    lifecycle
        .advertise_task(upstream.id(), &[original.id().clone()])
        .await?;

    let parts = lifecycle
        .split_task(SplitTaskRequest::new(
            original.id().clone(),
            vec!["First half".to_owned(), "Second half".to_owned()],
            vec!["a".to_owned(), "b".to_owned()],
        ))
        .await?;

    eyre::ensure!(parts.len() == 2, "expected two parts, got {}", parts.len());
    eyre::ensure!(
        parts.iter().all(|part| part.id() != original.id()),
        "parts must carry fresh IDs"
    );
    let refreshed = lifecycle.get_task(upstream.id()).await?;
    eyre::ensure!(
        refreshed.outflows().is_empty(),
        "upstream should no longer point at the split task"
    );
    let tasks = lifecycle.list_all_tasks().await?;
    eyre::ensure!(tasks.len() == 3, "expected upstream plus two parts");
    ensure_edges_symmetric(&tasks)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn split_with_mismatched_lists_is_rejected(stack: Stack) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    let original = stack.add(&owner, "Big job").await?;

    let result = stack
        .lifecycle
        .split_task(SplitTaskRequest::new(
            original.id().clone(),
            vec!["One".to_owned(), "Two".to_owned()],
            vec!["only one".to_owned()],
        ))
        .await;

    eyre::ensure!(
        matches!(result, Err(TaskLifecycleError::Domain(_))),
        "expected a validation error"
    );
    eyre::ensure!(
        stack.lifecycle.list_all_tasks().await?.len() == 1,
        "nothing should change"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dag_lists_prerequisites_before_dependents(stack: Stack) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    let first = stack.add(&owner, "First").await?;
    let second = stack.add(&owner, "Second").await?;
    let third = stack.add(&owner, "Third").await?;
    let lifecycle = &stack.lifecycle;
    lifecycle
        .stitch_tasks(&[first.id().clone(), second.id().clone()], third.id())
        .await?;
    lifecycle
        .advertise_task(second.id(), &[first.id().clone()])
        .await?;

    let order: Vec<_> = lifecycle
        .get_task_dag(&owner)
        .await?
        .into_iter()
        .map(|task| task.id().clone())
        .collect();

    eyre::ensure!(
        order == vec![second.id().clone(), first.id().clone(), third.id().clone()],
        "unexpected order {order:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_can_be_added_for_a_user_found_by_name_prefix(
    stack: Stack,
) -> Result<(), eyre::Report> {
    let owner = stack.user("Beatrice").await?;
    stack.user("Alice").await?;

    let found = stack.registry.resolve_user("bea")?;
    let task = stack.add(found.id(), "Garden").await?;

    eyre::ensure!(task.user_id() == &owner, "task should belong to Beatrice");
    eyre::ensure!(task.stage() == TaskStage::Inbox, "new tasks land in the inbox");
    Ok(())
}
