//! Shared test helpers for in-memory integration tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasker::config::LifecycleConfig;
use tasker::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskId},
    services::{AddTaskRequest, TaskLifecycleService},
};
use tasker::user::{
    adapters::memory::InMemoryUserRepository,
    domain::UserId,
    services::{CreateUserRequest, UserRegistryService},
};

/// Lifecycle service wired to in-memory repositories.
pub type Lifecycle =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryUserRepository, DefaultClock>;

/// Lifecycle and registry services sharing one user repository.
pub struct Stack {
    /// Task lifecycle service.
    pub lifecycle: Arc<Lifecycle>,
    /// User registration service.
    pub registry: UserRegistryService<InMemoryUserRepository>,
}

impl Stack {
    /// Wires both services with the given lifecycle configuration.
    #[must_use]
    pub fn new(config: LifecycleConfig) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let lifecycle = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::clone(&users),
            Arc::new(DefaultClock),
        )
        .with_config(config);
        Self {
            lifecycle: Arc::new(lifecycle),
            registry: UserRegistryService::new(users),
        }
    }

    /// Registers a user named `name` and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub async fn user(&self, name: &str) -> eyre::Result<UserId> {
        let email = format!("{}@example.com", name.to_lowercase());
        let user = self
            .registry
            .create_user(CreateUserRequest::new(email, name))
            .await?;
        Ok(user.id().clone())
    }

    /// Adds an Inbox task for `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lifecycle service rejects the task.
    pub async fn add(&self, owner: &UserId, name: &str) -> eyre::Result<Task> {
        Ok(self
            .lifecycle
            .add_task(AddTaskRequest::new(owner.clone(), name))
            .await?)
    }
}

/// Provides a stack with default configuration.
#[fixture]
pub fn stack() -> Stack {
    Stack::new(LifecycleConfig::default())
}

/// Checks that every inflow has a matching outflow and vice versa.
///
/// # Errors
///
/// Returns an error naming the first asymmetric edge.
pub fn ensure_edges_symmetric(tasks: &[Task]) -> eyre::Result<()> {
    let by_id: BTreeMap<&TaskId, &Task> = tasks.iter().map(|task| (task.id(), task)).collect();
    for task in tasks {
        for inflow in task.inflows() {
            let upstream = by_id
                .get(inflow)
                .ok_or_else(|| eyre::eyre!("inflow {inflow} of {} is missing", task.id()))?;
            eyre::ensure!(
                upstream.outflows().contains(task.id()),
                "{inflow} lacks outflow to {}",
                task.id()
            );
        }
        for outflow in task.outflows() {
            let downstream = by_id
                .get(outflow)
                .ok_or_else(|| eyre::eyre!("outflow {outflow} of {} is missing", task.id()))?;
            eyre::ensure!(
                downstream.inflows().contains(task.id()),
                "{outflow} lacks inflow from {}",
                task.id()
            );
        }
    }
    Ok(())
}
