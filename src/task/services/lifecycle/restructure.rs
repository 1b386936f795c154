//! Graph restructuring: merge, split, fan-out, fan-in, and ordered
//! retrieval.

use super::{SplitTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService};
use crate::task::{
    domain::{DependencyGraph, TagValue, Task, TaskDomainError, TaskId, TaskStage, topological_order},
    ports::TaskRepository,
};
use crate::user::{domain::UserId, ports::UserRepository};
use mockable::Clock;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

fn references(task: &Task, id: &TaskId) -> bool {
    task.inflows().contains(id) || task.outflows().contains(id)
}

impl<R, U, C> TaskLifecycleService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Merges `source_id` into `target_id` and deletes the source.
    ///
    /// The target absorbs the source's description, points, history, tags,
    /// and edges; every task that referenced the source is rewired to the
    /// target.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when either task is missing,
    /// [`TaskLifecycleError::LocationMismatch`] when their locations differ,
    /// [`TaskLifecycleError::CycleDetected`] when the merged graph would
    /// contain a cycle, and [`TaskLifecycleError::Domain`] when both IDs are
    /// the same.
    pub async fn merge_tasks(
        &self,
        source_id: &TaskId,
        target_id: &TaskId,
    ) -> TaskLifecycleResult<Task> {
        if source_id == target_id {
            return Err(TaskDomainError::SelfMerge(source_id.clone()).into());
        }

        let _guard = self.graph_lock.lock().await;
        let source = self.find_task_or_error(source_id).await?;
        let mut target = self.find_task_or_error(target_id).await?;
        if source.location() != target.location() {
            return Err(TaskLifecycleError::LocationMismatch {
                merged: source_id.clone(),
                target: target_id.clone(),
            });
        }

        let (mut neighbours, others): (Vec<Task>, Vec<Task>) = self
            .repository
            .list_all()
            .await?
            .into_iter()
            .filter(|task| task.id() != source_id && task.id() != target_id)
            .partition(|task| references(task, source_id));
        target.absorb(source, &*self.clock)?;
        for neighbour in &mut neighbours {
            neighbour.rewire(source_id, target_id, &*self.clock);
        }
        DependencyGraph::from_tasks(others.iter().chain(&neighbours).chain([&target]))
            .ensure_acyclic()
            .inspect_err(|err| {
                warn!(from = %err.from, to = %err.to, "rejected merge");
            })?;

        for neighbour in &neighbours {
            self.repository.update(neighbour).await?;
        }
        self.repository.update(&target).await?;
        self.repository.delete(source_id).await?;
        self.rebuild_resolver().await?;
        info!(
            source = %source_id,
            target = %target.id(),
            rewired = neighbours.len(),
            "merged tasks"
        );
        Ok(target)
    }

    /// Replaces a task with one new task per name/description pair.
    ///
    /// The original's edges are removed from its neighbours before it is
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for mismatched or empty input
    /// or a blank name, [`TaskLifecycleError::NotFound`] when the task is
    /// missing, and [`TaskLifecycleError::CapacityExceeded`] when splitting
    /// an Inbox task would overfill the inbox.
    pub async fn split_task(&self, request: SplitTaskRequest) -> TaskLifecycleResult<Vec<Task>> {
        let SplitTaskRequest {
            task_id,
            names,
            descriptions,
        } = request;
        if names.len() != descriptions.len() {
            return Err(TaskDomainError::SplitLengthMismatch {
                names: names.len(),
                descriptions: descriptions.len(),
            }
            .into());
        }
        if names.is_empty() {
            return Err(TaskDomainError::EmptySplit.into());
        }

        let _guard = self.graph_lock.lock().await;
        let original = self.find_task_or_error(&task_id).await?;
        if original.stage() == TaskStage::Inbox {
            let inbox = self.inbox_population(original.user_id()).await?;
            self.ensure_inbox_room(original.user_id(), inbox.saturating_sub(1), names.len())?;
        }
        let parts = names
            .iter()
            .zip(descriptions)
            .map(|(name, description)| {
                original.split_part(TaskId::generate(), name, description, &*self.clock)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let neighbour_ids: BTreeSet<&TaskId> =
            original.inflows().iter().chain(original.outflows()).collect();
        for neighbour_id in neighbour_ids {
            if let Some(mut neighbour) = self.repository.find_by_id(neighbour_id).await? {
                neighbour.unlink(&task_id, &*self.clock);
                self.repository.update(&neighbour).await?;
            }
        }
        for part in &parts {
            self.repository.store(part).await?;
        }
        self.repository.delete(&task_id).await?;
        self.rebuild_resolver().await?;
        info!(task_id = %task_id, parts = parts.len(), "split task");
        Ok(parts)
    }

    /// Makes `source_id` a prerequisite of every task in `target_ids`.
    ///
    /// Either every edge is added or none is.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an empty target list,
    /// [`TaskLifecycleError::NotFound`] for a missing task, and
    /// [`TaskLifecycleError::CycleDetected`] when any edge would close a
    /// cycle.
    pub async fn advertise_task(
        &self,
        source_id: &TaskId,
        target_ids: &[TaskId],
    ) -> TaskLifecycleResult<Task> {
        if target_ids.is_empty() {
            return Err(TaskDomainError::EmptyCounterparts.into());
        }

        let _guard = self.graph_lock.lock().await;
        let mut source = self.find_task_or_error(source_id).await?;
        let mut targets = self.find_tasks_or_error(target_ids).await?;
        let edges: Vec<(TaskId, TaskId)> = targets
            .iter()
            .map(|target| (source_id.clone(), target.id().clone()))
            .collect();
        self.ensure_edges_acyclic(&edges).await?;

        for target in &mut targets {
            target.add_inflow(source_id.clone(), &*self.clock);
            source.add_outflow(target.id().clone(), &*self.clock);
            self.repository.update(target).await?;
        }
        self.repository.update(&source).await?;
        info!(task_id = %source_id, targets = targets.len(), "advertised task");
        Ok(source)
    }

    /// Makes every task in `source_ids` a prerequisite of `target_id`.
    ///
    /// Returns the mutated sources followed by the target. Either every
    /// edge is added or none is.
    ///
    /// # Errors
    ///
    /// As for [`TaskLifecycleService::advertise_task`].
    pub async fn stitch_tasks(
        &self,
        source_ids: &[TaskId],
        target_id: &TaskId,
    ) -> TaskLifecycleResult<Vec<Task>> {
        if source_ids.is_empty() {
            return Err(TaskDomainError::EmptyCounterparts.into());
        }

        let _guard = self.graph_lock.lock().await;
        let mut target = self.find_task_or_error(target_id).await?;
        let mut sources = self.find_tasks_or_error(source_ids).await?;
        let edges: Vec<(TaskId, TaskId)> = sources
            .iter()
            .map(|source| (source.id().clone(), target_id.clone()))
            .collect();
        self.ensure_edges_acyclic(&edges).await?;

        for source in &mut sources {
            source.add_outflow(target_id.clone(), &*self.clock);
            target.add_inflow(source.id().clone(), &*self.clock);
            self.repository.update(source).await?;
        }
        self.repository.update(&target).await?;
        info!(task_id = %target_id, sources = sources.len(), "stitched tasks");
        sources.push(target);
        Ok(sources)
    }

    /// Returns `user_id`'s tasks with every prerequisite before its
    /// dependents; ready tasks are ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::CycleDetected`] if the stored graph
    /// contains a cycle.
    pub async fn get_task_dag(&self, user_id: &UserId) -> TaskLifecycleResult<Vec<Task>> {
        let tasks = self.repository.list_by_user(user_id).await?;
        Ok(topological_order(tasks)?)
    }

    /// Replaces a task's tags wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is missing.
    pub async fn update_task_tags(
        &self,
        task_id: &TaskId,
        tags: BTreeMap<String, TagValue>,
    ) -> TaskLifecycleResult<Task> {
        let _guard = self.graph_lock.lock().await;
        let mut task = self.find_task_or_error(task_id).await?;
        task.replace_tags(tags, &*self.clock);
        self.repository.update(&task).await?;
        info!(task_id = %task_id, tags = task.tags().len(), "replaced task tags");
        Ok(task)
    }
}
