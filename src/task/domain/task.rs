//! Task aggregate root and its lifecycle transitions.

use super::{
    Point, Schedule, StatusUpdate, TagValue, TaskDomainError, TaskId, TaskStage, TaskStatus,
    WorkInterval, remaining_points,
};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    user_id: UserId,
    name: String,
    description: String,
    stage: TaskStage,
    status: TaskStatus,
    location: Vec<String>,
    points: Vec<Point>,
    inflows: BTreeSet<TaskId>,
    outflows: BTreeSet<TaskId>,
    schedule: Schedule,
    status_history: Vec<StatusUpdate>,
    tags: BTreeMap<String, TagValue>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning user.
    pub user_id: UserId,
    /// Task name.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Lifecycle stage.
    pub stage: TaskStage,
    /// Execution status.
    pub status: TaskStatus,
    /// Hierarchical location path.
    pub location: Vec<String>,
    /// Outstanding work points.
    pub points: Vec<Point>,
    /// Prerequisite task identifiers.
    pub inflows: BTreeSet<TaskId>,
    /// Dependent task identifiers.
    pub outflows: BTreeSet<TaskId>,
    /// Work intervals and due date.
    pub schedule: Schedule,
    /// Status history, oldest first.
    pub status_history: Vec<StatusUpdate>,
    /// Typed tags.
    pub tags: BTreeMap<String, TagValue>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new Inbox task.
    ///
    /// The name is trimmed and one status history entry is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskName`] when the name is blank.
    pub fn new(
        id: TaskId,
        user_id: UserId,
        name: &str,
        description: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTaskName);
        }
        let timestamp = clock.utc();
        let mut task = Self {
            id,
            user_id,
            name: trimmed.to_owned(),
            description: description.into(),
            stage: TaskStage::Inbox,
            status: TaskStatus::Todo,
            location: Vec::new(),
            points: Vec::new(),
            inflows: BTreeSet::new(),
            outflows: BTreeSet::new(),
            schedule: Schedule::default(),
            status_history: Vec::new(),
            tags: BTreeMap::new(),
            created_at: timestamp,
            updated_at: timestamp,
        };
        task.record("task created", timestamp);
        Ok(task)
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            name: data.name,
            description: data.description,
            stage: data.stage,
            status: data.status,
            location: data.location,
            points: data.points,
            inflows: data.inflows,
            outflows: data.outflows,
            schedule: data.schedule,
            status_history: data.status_history,
            tags: data.tags,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the lifecycle stage.
    #[must_use]
    pub const fn stage(&self) -> TaskStage {
        self.stage
    }

    /// Returns the execution status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the hierarchical location path.
    #[must_use]
    pub fn location(&self) -> &[String] {
        &self.location
    }

    /// Returns the outstanding work points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the prerequisite task identifiers.
    #[must_use]
    pub const fn inflows(&self) -> &BTreeSet<TaskId> {
        &self.inflows
    }

    /// Returns the dependent task identifiers.
    #[must_use]
    pub const fn outflows(&self) -> &BTreeSet<TaskId> {
        &self.outflows
    }

    /// Returns the schedule.
    #[must_use]
    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Returns the status history, oldest first.
    #[must_use]
    pub fn status_history(&self) -> &[StatusUpdate] {
        &self.status_history
    }

    /// Returns the tags.
    #[must_use]
    pub const fn tags(&self) -> &BTreeMap<String, TagValue> {
        &self.tags
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves a Pending or Inbox task to Staging.
    ///
    /// `points` replaces the current points when given.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStageTransition`] from any other
    /// stage.
    pub fn move_to_staging(
        &mut self,
        location: Vec<String>,
        points: Option<Vec<Point>>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_transition(self.stage.can_stage(), TaskStage::Staging)?;
        self.location = location;
        if let Some(new_points) = points {
            self.points = new_points;
        }
        self.stage = TaskStage::Staging;
        self.status = TaskStatus::Todo;
        self.record("moved to staging", clock.utc());
        Ok(())
    }

    /// Starts work on a staged task and opens a work interval.
    ///
    /// Dependency gating is the caller's responsibility, since inflow
    /// statuses live on other aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStageTransition`] unless the task is
    /// in Staging with status Todo.
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        let startable = self.stage == TaskStage::Staging && self.status == TaskStatus::Todo;
        self.ensure_transition(startable, TaskStage::Active)?;
        let timestamp = clock.utc();
        self.stage = TaskStage::Active;
        self.status = TaskStatus::InProgress;
        self.schedule.work_intervals.push(WorkInterval::open(timestamp));
        self.record("started", timestamp);
        Ok(())
    }

    /// Stops work, crediting `completed` against the outstanding points.
    ///
    /// Returns `true` when every point is accounted for, in which case the
    /// task is completed. Otherwise the task returns to Staging keeping only
    /// the unmet remainder. A task with no points is never completed here.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStageTransition`] unless the task is
    /// Active.
    pub fn stop(
        &mut self,
        completed: Vec<Point>,
        clock: &impl Clock,
    ) -> Result<bool, TaskDomainError> {
        self.ensure_transition(self.stage == TaskStage::Active, TaskStage::Staging)?;
        let timestamp = clock.utc();
        let remaining = remaining_points(&self.points, &completed);
        let is_complete = !self.points.is_empty() && remaining.is_empty();
        self.schedule.close_open_interval(timestamp, completed);
        self.points = remaining;
        if is_complete {
            self.mark_completed(timestamp);
        } else {
            self.stage = TaskStage::Staging;
            self.status = TaskStatus::Todo;
            self.record("stopped with work remaining", timestamp);
        }
        Ok(is_complete)
    }

    /// Completes an Active task, crediting all outstanding points.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStageTransition`] unless the task is
    /// Active.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_transition(self.stage == TaskStage::Active, TaskStage::Archived)?;
        let timestamp = clock.utc();
        let credited = std::mem::take(&mut self.points);
        self.schedule.close_open_interval(timestamp, credited);
        self.mark_completed(timestamp);
        Ok(())
    }

    /// Replaces the tag map wholesale.
    pub fn replace_tags(&mut self, tags: BTreeMap<String, TagValue>, clock: &impl Clock) {
        self.tags = tags;
        self.updated_at = clock.utc();
    }

    /// Sets or clears the due date.
    pub fn set_due(&mut self, due: Option<DateTime<Utc>>, clock: &impl Clock) {
        self.schedule.due = due;
        self.updated_at = clock.utc();
    }

    /// Folds `source` into this task.
    ///
    /// Descriptions are joined by a newline, points and history are
    /// appended, source tags win on key collisions, and edge sets are
    /// unioned without any edge between the two tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfMerge`] when `source` has this task's
    /// identifier.
    pub fn absorb(&mut self, source: Self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if source.id == self.id {
            return Err(TaskDomainError::SelfMerge(source.id));
        }
        if !source.description.is_empty() {
            if !self.description.is_empty() {
                self.description.push('\n');
            }
            self.description.push_str(&source.description);
        }
        self.points.extend(source.points);
        self.status_history.extend(source.status_history);
        self.tags.extend(source.tags);
        let own_id = self.id.clone();
        let source_id = source.id;
        let unrelated = |id: &TaskId| *id != own_id && *id != source_id;
        self.inflows
            .extend(source.inflows.into_iter().filter(|id| unrelated(id)));
        self.outflows
            .extend(source.outflows.into_iter().filter(|id| unrelated(id)));
        self.inflows.remove(&source_id);
        self.outflows.remove(&source_id);
        self.record(format!("merged task {source_id}"), clock.utc());
        Ok(())
    }

    /// Creates one part of a split of this task.
    ///
    /// The part inherits owner, stage, location and tags, and starts with
    /// no edges or points. Parts of an Active task are in progress with a
    /// work interval opened now; every other part is Todo.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskName`] when the name is blank.
    pub fn split_part(
        &self,
        id: TaskId,
        name: &str,
        description: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let mut part = Self::new(id, self.user_id.clone(), name, description, clock)?;
        let timestamp = clock.utc();
        part.stage = self.stage;
        if part.stage == TaskStage::Active {
            part.status = TaskStatus::InProgress;
            part.schedule.work_intervals.push(WorkInterval::open(timestamp));
        }
        part.location.clone_from(&self.location);
        part.tags.clone_from(&self.tags);
        part.record(format!("split from task {}", self.id), timestamp);
        Ok(part)
    }

    /// Adds a prerequisite, recording it in the history when new.
    pub(crate) fn add_inflow(&mut self, id: TaskId, clock: &impl Clock) {
        let message = format!("depends on task {id}");
        if self.inflows.insert(id) {
            self.record(message, clock.utc());
        }
    }

    /// Adds a dependent, recording it in the history when new.
    pub(crate) fn add_outflow(&mut self, id: TaskId, clock: &impl Clock) {
        let message = format!("feeds task {id}");
        if self.outflows.insert(id) {
            self.record(message, clock.utc());
        }
    }

    /// Replaces `old` with `new` in both edge sets, dropping any self edge.
    pub(crate) fn rewire(&mut self, old: &TaskId, new: &TaskId, clock: &impl Clock) {
        let mut changed = false;
        for edges in [&mut self.inflows, &mut self.outflows] {
            if edges.remove(old) {
                changed = true;
                if *new != self.id {
                    edges.insert(new.clone());
                }
            }
        }
        if changed {
            self.updated_at = clock.utc();
        }
    }

    /// Removes `id` from both edge sets.
    pub(crate) fn unlink(&mut self, id: &TaskId, clock: &impl Clock) {
        let removed_inflow = self.inflows.remove(id);
        let removed_outflow = self.outflows.remove(id);
        if removed_inflow || removed_outflow {
            self.updated_at = clock.utc();
        }
    }

    fn mark_completed(&mut self, timestamp: DateTime<Utc>) {
        self.stage = TaskStage::Archived;
        self.status = TaskStatus::Completed;
        self.record("completed", timestamp);
    }

    fn ensure_transition(&self, allowed: bool, to: TaskStage) -> Result<(), TaskDomainError> {
        if allowed {
            return Ok(());
        }
        Err(TaskDomainError::InvalidStageTransition {
            task_id: self.id.clone(),
            from: self.stage,
            to,
        })
    }

    fn record(&mut self, message: impl Into<String>, timestamp: DateTime<Utc>) {
        self.status_history.push(StatusUpdate {
            time: timestamp,
            stage: self.stage,
            status: self.status,
            message: message.into(),
        });
        self.updated_at = timestamp;
    }
}
