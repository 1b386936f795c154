//! Work quantities, work intervals, and the status history log.

use super::{TaskStage, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A titled quantity of work, e.g. `{ title: "review", value: 3 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Kind of work.
    pub title: String,
    /// Amount of work.
    pub value: u32,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub fn new(title: impl Into<String>, value: u32) -> Self {
        Self {
            title: title.into(),
            value,
        }
    }
}

/// A span of time during which the task was Active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// When work started.
    pub start: DateTime<Utc>,
    /// When work stopped; `None` while the interval is open.
    pub stop: Option<DateTime<Utc>>,
    /// Points credited when the interval was closed.
    pub points_completed: Vec<Point>,
}

impl WorkInterval {
    /// Opens an interval at `start`.
    #[must_use]
    pub const fn open(start: DateTime<Utc>) -> Self {
        Self {
            start,
            stop: None,
            points_completed: Vec::new(),
        }
    }

    /// Returns whether the interval has not been closed yet.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.stop.is_none()
    }
}

/// Timing information for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Work intervals in the order they were opened.
    pub work_intervals: Vec<WorkInterval>,
    /// Optional due date.
    pub due: Option<DateTime<Utc>>,
}

impl Schedule {
    /// Closes the most recent interval if it is still open.
    ///
    /// Returns whether an interval was closed.
    pub fn close_open_interval(&mut self, stop: DateTime<Utc>, credited: Vec<Point>) -> bool {
        match self.work_intervals.last_mut() {
            Some(interval) if interval.is_open() => {
                interval.stop = Some(stop);
                interval.points_completed = credited;
                true
            }
            _ => false,
        }
    }
}

/// One entry in a task's append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// When the change happened.
    pub time: DateTime<Utc>,
    /// Stage after the change.
    pub stage: TaskStage,
    /// Status after the change.
    pub status: TaskStatus,
    /// Human-readable description of the change.
    pub message: String,
}

/// Subtracts `completed` from `required`, per title, floored at zero.
///
/// Credits for a title are pooled and consumed by `required` entries in
/// order. Entries reduced to zero are dropped, so an empty result means
/// every point was accounted for.
///
/// # Examples
///
/// ```
/// use tasker::task::domain::{Point, remaining_points};
///
/// let required = [Point::new("code", 5), Point::new("review", 2)];
/// let completed = [Point::new("code", 3), Point::new("review", 4)];
/// assert_eq!(remaining_points(&required, &completed), vec![Point::new("code", 2)]);
/// ```
#[must_use]
pub fn remaining_points(required: &[Point], completed: &[Point]) -> Vec<Point> {
    let mut credit: BTreeMap<&str, u32> = BTreeMap::new();
    for point in completed {
        let pooled = credit.entry(point.title.as_str()).or_insert(0);
        *pooled = pooled.saturating_add(point.value);
    }

    let mut remaining = Vec::new();
    for point in required {
        let applied = credit.get_mut(point.title.as_str()).map_or(0, |available| {
            let taken = (*available).min(point.value);
            *available = available.saturating_sub(taken);
            taken
        });
        let left = point.value.saturating_sub(applied);
        if left > 0 {
            remaining.push(Point::new(point.title.clone(), left));
        }
    }
    remaining
}
