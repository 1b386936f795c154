//! Short-ID resolution stays current as the task population changes.

use super::helpers::{Stack, stack};
use rstest::rstest;
use tasker::config::LifecycleConfig;
use tasker::resolution::ResolutionError;
use tasker::task::services::{SplitTaskRequest, TaskLifecycleError};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn added_task_resolves_by_its_minimum_prefix(stack: Stack) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    let task = stack.add(&owner, "Fresh").await?;

    let prefix = stack.lifecycle.resolver().get_minimum_unique_prefix(task.id())?;
    let resolved = stack.lifecycle.resolve_task_id(&prefix, Some(&owner))?;

    eyre::ensure!(&resolved == task.id(), "prefix {prefix} resolved to {resolved}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn every_listed_prefix_round_trips() -> Result<(), eyre::Report> {
    let stack = Stack::new(LifecycleConfig::with_max_inbox_size(40));
    let alice = stack.user("Alice").await?;
    let bob = stack.user("Bob").await?;
    for index in 0..20 {
        stack.add(&alice, &format!("Alice {index}")).await?;
        stack.add(&bob, &format!("Bob {index}")).await?;
    }
    let resolver = stack.lifecycle.resolver();

    let global = resolver.list_tasks_with_prefixes();
    eyre::ensure!(global.len() == 40, "expected forty indexed tasks");
    for (id, prefix) in &global {
        eyre::ensure!(&resolver.resolve_task_id(prefix)? == id, "global prefix {prefix}");
    }
    for (id, prefix) in resolver.list_tasks_with_prefixes_for_user(&alice) {
        let resolved = resolver.resolve_task_id_for_user(&prefix, &alice)?;
        eyre::ensure!(resolved == id, "per-user prefix {prefix}");
        eyre::ensure!(
            prefix.len() <= global.get(&id).map_or(0, String::len),
            "per-user prefix should never be longer than the global one"
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merged_source_stops_resolving(stack: Stack) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    let source = stack.add(&owner, "Source").await?;
    let target = stack.add(&owner, "Target").await?;

    stack.lifecycle.merge_tasks(source.id(), target.id()).await?;

    let result = stack.lifecycle.resolve_task_id(source.id().as_str(), None);
    eyre::ensure!(
        matches!(
            result,
            Err(TaskLifecycleError::Resolution(ResolutionError::NotFound(_)))
        ),
        "merged source should be gone, got {result:?}"
    );
    eyre::ensure!(
        !stack.lifecycle.resolver().contains(source.id()),
        "resolver still indexes the source"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn split_parts_resolve_and_original_does_not(stack: Stack) -> Result<(), eyre::Report> {
    let owner = stack.user("Alice").await?;
    let original = stack.add(&owner, "Big").await?;

    let parts = stack
        .lifecycle
        .split_task(SplitTaskRequest::new(
            original.id().clone(),
            vec!["Left".to_owned(), "Right".to_owned()],
            vec![String::new(), String::new()],
        ))
        .await?;

    let resolver = stack.lifecycle.resolver();
    eyre::ensure!(!resolver.contains(original.id()), "original still indexed");
    for part in &parts {
        let resolved = stack
            .lifecycle
            .resolve_task_id(part.id().as_str(), Some(&owner))?;
        eyre::ensure!(&resolved == part.id(), "part {} did not resolve", part.id());
    }
    eyre::ensure!(resolver.len() == 2, "expected exactly the two parts");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_users_tasks_do_not_resolve_per_user(stack: Stack) -> Result<(), eyre::Report> {
    let alice = stack.user("Alice").await?;
    let bob = stack.user("Bob").await?;
    let bobs = stack.add(&bob, "Private").await?;

    let result = stack
        .lifecycle
        .resolve_task_id(bobs.id().as_str(), Some(&alice));

    eyre::ensure!(result.is_err(), "Alice must not resolve Bob's task");
    eyre::ensure!(
        stack.lifecycle.resolve_task_id(bobs.id().as_str(), None)? == *bobs.id(),
        "global resolution should still find it"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn suggestions_are_scoped_and_limited(stack: Stack) -> Result<(), eyre::Report> {
    let alice = stack.user("Alice").await?;
    let bob = stack.user("Bob").await?;
    for index in 0..4 {
        stack.add(&alice, &format!("Alice {index}")).await?;
    }
    let bobs = stack.add(&bob, "Bob's").await?;

    let everything = stack.lifecycle.suggest_task_ids("", None);
    let alices = stack.lifecycle.suggest_task_ids("", Some(&alice));

    eyre::ensure!(everything.len() == 5, "default limit is five");
    eyre::ensure!(alices.len() == 4, "Alice owns four tasks");
    eyre::ensure!(
        !alices.iter().any(|id| id == bobs.id().as_str()),
        "Bob's task leaked into Alice's suggestions"
    );
    Ok(())
}
