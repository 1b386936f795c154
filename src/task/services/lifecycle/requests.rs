//! Request and outcome types for lifecycle operations.

use crate::task::domain::{Point, Task, TaskId};
use crate::user::domain::UserId;

/// Request payload for adding a task to a user's inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTaskRequest {
    pub(super) user_id: UserId,
    pub(super) name: String,
    pub(super) description: String,
}

impl AddTaskRequest {
    /// Creates a request for `user_id` with the given task name.
    #[must_use]
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            description: String::new(),
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Request payload for moving a task to Staging.
///
/// Staging under a destination inherits its location and makes the
/// destination a prerequisite; otherwise a location must be given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveToStagingRequest {
    pub(super) task_id: TaskId,
    pub(super) destination: Option<TaskId>,
    pub(super) location: Vec<String>,
    pub(super) points: Option<Vec<Point>>,
}

impl MoveToStagingRequest {
    /// Creates a request for `task_id`.
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            destination: None,
            location: Vec::new(),
            points: None,
        }
    }

    /// Stages the task under `destination`.
    #[must_use]
    pub fn with_destination(mut self, destination: TaskId) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Sets an explicit location path. Ignored when a destination is set.
    #[must_use]
    pub fn with_location<I, S>(mut self, location: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.location = location.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the task's work points.
    #[must_use]
    pub fn with_points(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.points = Some(points.into_iter().collect());
        self
    }
}

/// Request payload for splitting a task into new tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTaskRequest {
    pub(super) task_id: TaskId,
    pub(super) names: Vec<String>,
    pub(super) descriptions: Vec<String>,
}

impl SplitTaskRequest {
    /// Creates a request; `names` and `descriptions` pair up by position.
    #[must_use]
    pub const fn new(task_id: TaskId, names: Vec<String>, descriptions: Vec<String>) -> Self {
        Self {
            task_id,
            names,
            descriptions,
        }
    }
}

/// Result of stopping work on a task.
#[derive(Debug, Clone, PartialEq)]
pub struct StopTaskOutcome {
    /// The task after the stop.
    pub task: Task,
    /// Whether every point was accounted for and the task completed.
    pub is_complete: bool,
}
