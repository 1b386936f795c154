//! Service layer for task stage transitions and dependency gating.
//!
//! Every mutating operation runs under one graph lock, so a cycle check
//! never observes a graph that another operation is halfway through
//! changing. Operations that change the set of task identifiers refresh the
//! [`TaskIdResolver`] before returning.

mod requests;
mod restructure;

pub use requests::{AddTaskRequest, MoveToStagingRequest, SplitTaskRequest, StopTaskOutcome};

use crate::config::LifecycleConfig;
use crate::error::ErrorKind;
use crate::resolution::ResolutionError;
use crate::task::{
    domain::{
        CycleError, DependencyGraph, Point, Task, TaskDomainError, TaskId, TaskStage, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError},
    resolver::TaskIdResolver,
};
use crate::user::{
    domain::UserId,
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// User repository operation failed.
    #[error(transparent)]
    UserRepository(#[from] UserRepositoryError),
    /// A partial task identifier could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// The owning user does not exist.
    #[error("user {0} not found")]
    UnknownOwner(UserId),
    /// The task has prerequisites that are not completed.
    #[error("task {task_id} has unfinished dependencies: {}", join_ids(.unmet))]
    DependencyNotSatisfied {
        /// Task that could not start.
        task_id: TaskId,
        /// Prerequisites that are not completed, ascending.
        unmet: Vec<TaskId>,
    },
    /// The owner's inbox has no room.
    #[error("inbox for user {user_id} is full (capacity {capacity})")]
    CapacityExceeded {
        /// Owner of the inbox.
        user_id: UserId,
        /// Configured inbox capacity.
        capacity: usize,
    },
    /// The operation would create a dependency cycle.
    #[error(transparent)]
    CycleDetected(#[from] CycleError),
    /// Merged tasks must share a location.
    #[error("tasks {merged} and {target} are in different locations")]
    LocationMismatch {
        /// Task being merged away.
        merged: TaskId,
        /// Task absorbing the merge.
        target: TaskId,
    },
}

impl TaskLifecycleError {
    /// Returns the transport-neutral error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::Validation,
            Self::Repository(err) => err.kind(),
            Self::UserRepository(err) => err.kind(),
            Self::Resolution(err) => err.kind(),
            Self::NotFound(_) | Self::UnknownOwner(_) => ErrorKind::NotFound,
            Self::DependencyNotSatisfied { .. } => ErrorKind::DependencyNotSatisfied,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::CycleDetected(_) => ErrorKind::CycleDetected,
            Self::LocationMismatch { .. } => ErrorKind::LocationMismatch,
        }
    }
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Clones share the repositories, clock, resolver, and graph lock.
pub struct TaskLifecycleService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    users: Arc<U>,
    clock: Arc<C>,
    resolver: Arc<TaskIdResolver>,
    config: LifecycleConfig,
    graph_lock: Arc<Mutex<()>>,
}

impl<R, U, C> Clone for TaskLifecycleService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            users: Arc::clone(&self.users),
            clock: Arc::clone(&self.clock),
            resolver: Arc::clone(&self.resolver),
            config: self.config.clone(),
            graph_lock: Arc::clone(&self.graph_lock),
        }
    }
}

impl<R, U, C> TaskLifecycleService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service with default configuration and
    /// an empty identifier resolver.
    ///
    /// Call [`TaskLifecycleService::refresh_resolver`] once when the
    /// repository already holds tasks.
    #[must_use]
    pub fn new(repository: Arc<R>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            repository,
            users,
            clock,
            resolver: Arc::new(TaskIdResolver::new()),
            config: LifecycleConfig::default(),
            graph_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Replaces the service configuration.
    #[must_use]
    pub const fn with_config(mut self, config: LifecycleConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the identifier resolver kept current by this service.
    #[must_use]
    pub fn resolver(&self) -> Arc<TaskIdResolver> {
        Arc::clone(&self.resolver)
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Adds a task to the owner's inbox.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for a blank name,
    /// [`TaskLifecycleError::UnknownOwner`] when the user does not exist, and
    /// [`TaskLifecycleError::CapacityExceeded`] when the inbox is full.
    pub async fn add_task(&self, request: AddTaskRequest) -> TaskLifecycleResult<Task> {
        let AddTaskRequest {
            user_id,
            name,
            description,
        } = request;
        let task = Task::new(TaskId::generate(), user_id, &name, description, &*self.clock)?;

        let _guard = self.graph_lock.lock().await;
        if self.users.find_by_id(task.user_id()).await?.is_none() {
            return Err(TaskLifecycleError::UnknownOwner(task.user_id().clone()));
        }
        let inbox = self.inbox_population(task.user_id()).await?;
        self.ensure_inbox_room(task.user_id(), inbox, 1)?;
        self.repository.store(&task).await?;
        self.rebuild_resolver().await?;
        info!(
            task_id = %task.id(),
            user_id = %task.user_id(),
            stage = %task.stage(),
            "added task"
        );
        Ok(task)
    }

    /// Moves a Pending or Inbox task to Staging.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for a missing task or
    /// destination, [`TaskLifecycleError::CycleDetected`] when the new
    /// inflow would close a cycle, and [`TaskLifecycleError::Domain`] when
    /// the stage forbids staging or neither destination nor location is
    /// given.
    pub async fn move_to_staging(&self, request: MoveToStagingRequest) -> TaskLifecycleResult<Task> {
        let MoveToStagingRequest {
            task_id,
            destination,
            location,
            points,
        } = request;

        let _guard = self.graph_lock.lock().await;
        let mut task = self.find_task_or_error(&task_id).await?;
        let Some(destination_id) = destination else {
            if location.is_empty() {
                return Err(TaskDomainError::MissingStagingTarget(task_id).into());
            }
            task.move_to_staging(location, points, &*self.clock)?;
            self.repository.update(&task).await?;
            info!(task_id = %task.id(), stage = %task.stage(), "staged task");
            return Ok(task);
        };

        let mut destination_task = self.find_task_or_error(&destination_id).await?;
        self.ensure_edges_acyclic(&[(destination_id.clone(), task_id.clone())])
            .await?;
        task.move_to_staging(destination_task.location().to_vec(), points, &*self.clock)?;
        task.add_inflow(destination_id, &*self.clock);
        destination_task.add_outflow(task_id, &*self.clock);
        self.repository.update(&destination_task).await?;
        self.repository.update(&task).await?;
        info!(
            task_id = %task.id(),
            destination = %destination_task.id(),
            stage = %task.stage(),
            "staged task under destination"
        );
        Ok(task)
    }

    /// Starts work on a staged task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] unless the task is staged and
    /// not yet started, and [`TaskLifecycleError::DependencyNotSatisfied`]
    /// while any inflow is not completed.
    pub async fn start_task(&self, task_id: &TaskId) -> TaskLifecycleResult<Task> {
        let _guard = self.graph_lock.lock().await;
        let mut task = self.find_task_or_error(task_id).await?;
        task.start(&*self.clock)?;

        let unmet = self.unmet_inflows(&task).await?;
        if !unmet.is_empty() {
            debug!(task_id = %task_id, unmet = unmet.len(), "start blocked by dependencies");
            return Err(TaskLifecycleError::DependencyNotSatisfied {
                task_id: task_id.clone(),
                unmet,
            });
        }
        self.repository.update(&task).await?;
        info!(task_id = %task.id(), stage = %task.stage(), "started task");
        Ok(task)
    }

    /// Stops work on an active task, crediting `completed` points.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] unless the task is Active.
    pub async fn stop_task(
        &self,
        task_id: &TaskId,
        completed: Vec<Point>,
    ) -> TaskLifecycleResult<StopTaskOutcome> {
        let _guard = self.graph_lock.lock().await;
        let mut task = self.find_task_or_error(task_id).await?;
        let is_complete = task.stop(completed, &*self.clock)?;
        self.repository.update(&task).await?;
        info!(
            task_id = %task.id(),
            stage = %task.stage(),
            is_complete,
            "stopped task"
        );
        Ok(StopTaskOutcome { task, is_complete })
    }

    /// Completes an active task and archives it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] unless the task is Active.
    pub async fn complete_task(&self, task_id: &TaskId) -> TaskLifecycleResult<Task> {
        let _guard = self.graph_lock.lock().await;
        let mut task = self.find_task_or_error(task_id).await?;
        task.complete(&*self.clock)?;
        self.repository.update(&task).await?;
        info!(task_id = %task.id(), stage = %task.stage(), "completed task");
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not
    /// exist.
    pub async fn get_task(&self, task_id: &TaskId) -> TaskLifecycleResult<Task> {
        self.find_task_or_error(task_id).await
    }

    /// Lists a user's tasks, optionally restricted to one stage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_tasks_by_user(
        &self,
        user_id: &UserId,
        stage: Option<TaskStage>,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let mut tasks = self.repository.list_by_user(user_id).await?;
        if let Some(wanted) = stage {
            tasks.retain(|task| task.stage() == wanted);
        }
        Ok(tasks)
    }

    /// Lists every stored task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_all_tasks(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.list_all().await?)
    }

    /// Resolves a partial task identifier, within one user's tasks when
    /// `user_id` is given.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Resolution`] when the input is empty,
    /// unknown, or ambiguous.
    pub fn resolve_task_id(
        &self,
        partial: &str,
        user_id: Option<&UserId>,
    ) -> TaskLifecycleResult<TaskId> {
        let resolved = match user_id {
            Some(owner) => self.resolver.resolve_task_id_for_user(partial, owner),
            None => self.resolver.resolve_task_id(partial),
        };
        Ok(resolved?)
    }

    /// Suggests task identifiers starting with `partial`, up to the
    /// configured suggestion limit.
    #[must_use]
    pub fn suggest_task_ids(&self, partial: &str, user_id: Option<&UserId>) -> Vec<String> {
        self.resolver
            .suggest_similar_ids(partial, user_id, self.config.suggestion_limit)
    }

    /// Rebuilds the identifier resolver from the repository once any
    /// in-flight graph mutation has finished.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when listing fails.
    pub async fn refresh_resolver(&self) -> TaskLifecycleResult<()> {
        let _guard = self.graph_lock.lock().await;
        self.rebuild_resolver().await
    }

    /// Rebuilds the resolver; the caller must hold the graph lock.
    async fn rebuild_resolver(&self) -> TaskLifecycleResult<()> {
        let tasks = self.repository.list_all().await?;
        self.resolver.update_tasks(&tasks);
        Ok(())
    }

    async fn find_task_or_error(&self, task_id: &TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| TaskLifecycleError::NotFound(task_id.clone()))
    }

    /// Loads each distinct identifier once, in first-seen order.
    async fn find_tasks_or_error(&self, task_ids: &[TaskId]) -> TaskLifecycleResult<Vec<Task>> {
        let mut tasks: Vec<Task> = Vec::with_capacity(task_ids.len());
        for task_id in task_ids {
            if tasks.iter().any(|task| task.id() == task_id) {
                continue;
            }
            tasks.push(self.find_task_or_error(task_id).await?);
        }
        Ok(tasks)
    }

    async fn inbox_population(&self, user_id: &UserId) -> TaskLifecycleResult<usize> {
        let tasks = self.repository.list_by_user(user_id).await?;
        Ok(tasks
            .iter()
            .filter(|task| task.stage() == TaskStage::Inbox)
            .count())
    }

    fn ensure_inbox_room(
        &self,
        user_id: &UserId,
        current: usize,
        incoming: usize,
    ) -> TaskLifecycleResult<()> {
        let capacity = self.config.max_inbox_size;
        if current.saturating_add(incoming) > capacity {
            warn!(user_id = %user_id, current, capacity, "inbox capacity exceeded");
            return Err(TaskLifecycleError::CapacityExceeded {
                user_id: user_id.clone(),
                capacity,
            });
        }
        Ok(())
    }

    /// Checks `proposed` edges against the stored graph without applying
    /// them.
    async fn ensure_edges_acyclic(&self, proposed: &[(TaskId, TaskId)]) -> TaskLifecycleResult<()> {
        let tasks = self.repository.list_all().await?;
        DependencyGraph::from_tasks(&tasks)
            .check_edges(proposed)
            .inspect_err(|err| {
                warn!(from = %err.from, to = %err.to, "rejected dependency edge");
            })?;
        Ok(())
    }

    /// Inflows that are not completed. Missing inflows count as unmet.
    async fn unmet_inflows(&self, task: &Task) -> TaskLifecycleResult<Vec<TaskId>> {
        let mut unmet = Vec::new();
        for inflow_id in task.inflows() {
            let completed = self
                .repository
                .find_by_id(inflow_id)
                .await?
                .is_some_and(|inflow| inflow.status() == TaskStatus::Completed);
            if !completed {
                unmet.push(inflow_id.clone());
            }
        }
        Ok(unmet)
    }
}
