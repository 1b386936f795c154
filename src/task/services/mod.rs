//! Application services for task lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{
    AddTaskRequest, MoveToStagingRequest, SplitTaskRequest, StopTaskOutcome, TaskLifecycleError,
    TaskLifecycleResult, TaskLifecycleService,
};
