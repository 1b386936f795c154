//! Coarse lifecycle stages and fine-grained execution statuses.

use super::{ParseTaskStageError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle position of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStage {
    /// Recorded but not yet triaged.
    Pending,
    /// Newly captured; capacity-limited per user.
    Inbox,
    /// Located and sized, waiting to be worked on.
    Staging,
    /// Being worked on.
    Active,
    /// Finished; kept for history but outside active working sets.
    Archived,
}

impl TaskStage {
    /// Every stage in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Inbox,
        Self::Staging,
        Self::Active,
        Self::Archived,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Inbox => "inbox",
            Self::Staging => "staging",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    /// Returns whether a task in this stage may be moved to staging.
    #[must_use]
    pub const fn can_stage(self) -> bool {
        matches!(self, Self::Pending | Self::Inbox)
    }
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStage {
    type Error = ParseTaskStageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "inbox" => Ok(Self::Inbox),
            "staging" => Ok(Self::Staging),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseTaskStageError(value.to_owned())),
        }
    }
}

/// Execution state of a task, constrained by its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not being worked on.
    Todo,
    /// Being worked on (stage is Active).
    InProgress,
    /// Finished (stage is Archived).
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}
