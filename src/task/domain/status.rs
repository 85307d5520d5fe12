//! Task status, the transition table, and the opaque task classifications.

use super::{ParseTaskAttributeError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task has been created but work has not started.
    Open,
    /// Task is being worked on.
    InProgress,
    /// Task cannot progress until something external changes.
    Blocked,
    /// Work is finished and awaiting closure.
    Resolved,
    /// Task is closed. Terminal.
    Closed,
}

impl TaskStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::InProgress,
        Self::Blocked,
        Self::Resolved,
        Self::Closed,
    ];

    /// Returns the canonical storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Blocked => "BLOCKED",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }

    /// The transition table: statuses reachable from `self` in one step.
    ///
    /// There are no self-loops, so re-requesting the current status is
    /// always rejected.
    #[must_use]
    pub const fn allowed_targets(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::InProgress, Self::Blocked],
            Self::Blocked => &[Self::InProgress],
            Self::InProgress => &[Self::Resolved],
            Self::Resolved => &[Self::Closed],
            Self::Closed => &[],
        }
    }

    /// Returns `true` when `(self, target)` is an edge of the transition
    /// table.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Returns `true` for the terminal status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "BLOCKED" => Ok(Self::Blocked),
            "RESOLVED" => Ok(Self::Resolved),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority. Opaque to the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Default urgency.
    Medium,
    /// Should be picked up soon.
    High,
    /// Needs immediate attention.
    Critical,
}

impl TaskPriority {
    /// Returns the canonical storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskAttributeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(ParseTaskAttributeError::new("priority", value)),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of work a task represents. Opaque to the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Defect report.
    Bug,
    /// New capability.
    Feature,
    /// Enhancement of existing behaviour.
    Improvement,
    /// Maintenance work.
    Chore,
}

impl TaskType {
    /// Returns the canonical storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "BUG",
            Self::Feature => "FEATURE",
            Self::Improvement => "IMPROVEMENT",
            Self::Chore => "CHORE",
        }
    }
}

impl TryFrom<&str> for TaskType {
    type Error = ParseTaskAttributeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BUG" => Ok(Self::Bug),
            "FEATURE" => Ok(Self::Feature),
            "IMPROVEMENT" => Ok(Self::Improvement),
            "CHORE" => Ok(Self::Chore),
            _ => Err(ParseTaskAttributeError::new("type", value)),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
