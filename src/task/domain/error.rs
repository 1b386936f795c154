//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStage};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is empty or contains whitespace.
    #[error("invalid task identifier '{0}'")]
    InvalidTaskId(String),

    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The requested stage change is not permitted from the current stage.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidStageTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current stage.
        from: TaskStage,
        /// Requested stage.
        to: TaskStage,
    },

    /// Staging needs either a destination task or a location.
    #[error("task {0} needs a destination or a location to be staged")]
    MissingStagingTarget(TaskId),

    /// Split names and descriptions differ in length.
    #[error("split needs matching names and descriptions, got {names} names and {descriptions} descriptions")]
    SplitLengthMismatch {
        /// Number of names supplied.
        names: usize,
        /// Number of descriptions supplied.
        descriptions: usize,
    },

    /// A split was requested with no parts.
    #[error("split needs at least one new task")]
    EmptySplit,

    /// A task was merged into itself.
    #[error("task {0} cannot be merged into itself")]
    SelfMerge(TaskId),

    /// A fan-out or fan-in was requested with no counterpart tasks.
    #[error("at least one counterpart task is required")]
    EmptyCounterparts,
}

/// Error returned while parsing task stages from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task stage: {0}")]
pub struct ParseTaskStageError(pub String);

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
