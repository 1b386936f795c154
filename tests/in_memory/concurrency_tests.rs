//! Parallel graph mutations never corrupt the dependency graph.

use super::helpers::{Stack, ensure_edges_symmetric};
use tasker::config::LifecycleConfig;
use tasker::task::{domain::TaskId, services::AddTaskRequest};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn opposing_edges_added_concurrently_never_form_a_cycle() -> Result<(), eyre::Report> {
    let stack = Stack::new(LifecycleConfig::with_max_inbox_size(16));
    let owner = stack.user("Alice").await?;
    let mut ids: Vec<TaskId> = Vec::new();
    for index in 0..6 {
        ids.push(stack.add(&owner, &format!("Node {index}")).await?.id().clone());
    }

    let mut handles = Vec::new();
    for from in &ids {
        for to in &ids {
            if from == to {
                continue;
            }
            let lifecycle = std::sync::Arc::clone(&stack.lifecycle);
            let source = from.clone();
            let target = to.clone();
            handles.push(tokio::spawn(async move {
                lifecycle.advertise_task(&source, &[target]).await
            }));
        }
    }
    let mut accepted = 0_usize;
    for handle in handles {
        if handle.await?.is_ok() {
            accepted += 1;
        }
    }

    eyre::ensure!(accepted > 0, "at least one edge should be accepted");
    let ordered = stack.lifecycle.get_task_dag(&owner).await?;
    eyre::ensure!(ordered.len() == ids.len(), "every task should be ordered");
    ensure_edges_symmetric(&ordered)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_never_overfill_the_inbox() -> Result<(), eyre::Report> {
    let stack = Stack::new(LifecycleConfig::with_max_inbox_size(5));
    let owner = stack.user("Alice").await?;

    let handles: Vec<_> = (0..12)
        .map(|index| {
            let lifecycle = std::sync::Arc::clone(&stack.lifecycle);
            let request = AddTaskRequest::new(owner.clone(), format!("Task {index}"));
            tokio::spawn(async move { lifecycle.add_task(request).await })
        })
        .collect();
    let mut admitted = 0_usize;
    for handle in handles {
        if handle.await?.is_ok() {
            admitted += 1;
        }
    }

    eyre::ensure!(admitted == 5, "expected exactly five admissions, got {admitted}");
    eyre::ensure!(
        stack.lifecycle.list_tasks_by_user(&owner, None).await?.len() == 5,
        "stored population should match admissions"
    );
    Ok(())
}
