//! Domain model for task lifecycle management.
//!
//! Tasks move through ordered stages, carry work points and typed tags, and
//! form a dependency graph through their inflow and outflow sets. All rules
//! here are pure; persistence and locking live outside the domain boundary.

mod error;
mod graph;
mod ids;
mod schedule;
mod stage;
mod tag;
mod task;

pub use error::{ParseTaskStageError, ParseTaskStatusError, TaskDomainError};
pub use graph::{CycleError, DependencyGraph, topological_order};
pub use ids::TaskId;
pub use schedule::{Point, Schedule, StatusUpdate, WorkInterval, remaining_points};
pub use stage::{TaskStage, TaskStatus};
pub use tag::{GeographicLocation, TagValue};
pub use task::{PersistedTaskData, Task};
