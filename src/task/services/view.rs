//! Response representations of tasks.

use crate::task::domain::{Task, TaskId, TaskPriority, TaskStatus, TaskType, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Response representation of a task, optionally with its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    /// Task identifier.
    pub id: TaskId,
    /// Parent task identifier.
    pub parent_id: Option<TaskId>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Work classification.
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// Assignee.
    pub assigned_to: Option<UserId>,
    /// Creator.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Direct children, each carrying its own children. Empty for listings.
    pub children: Vec<TaskView>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            parent_id: task.parent_id(),
            title: task.title().to_owned(),
            description: task.description().map(ToOwned::to_owned),
            status: task.status(),
            priority: task.priority(),
            task_type: task.task_type(),
            assigned_to: task.assigned_to(),
            created_by: task.created_by(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
            children: Vec::new(),
        }
    }
}

impl TaskView {
    /// Assembles a nested view from tasks listed parents-before-children.
    ///
    /// `ordered` must start with the root and list every other task after
    /// its parent. Children keep their relative order. Built bottom-up
    /// without recursion, so depth is bounded only by memory.
    pub(crate) fn assemble(ordered: &[Task]) -> Option<Self> {
        let mut built: HashMap<TaskId, Self> = HashMap::with_capacity(ordered.len());
        let mut child_ids: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        for task in ordered.iter().skip(1) {
            if let Some(parent_id) = task.parent_id() {
                child_ids.entry(parent_id).or_default().push(task.id());
            }
        }

        for task in ordered.iter().rev() {
            let mut view = Self::from(task);
            if let Some(ids) = child_ids.remove(&task.id()) {
                view.children = ids.iter().filter_map(|id| built.remove(id)).collect();
            }
            built.insert(task.id(), view);
        }

        ordered.first().and_then(|root| built.remove(&root.id()))
    }
}
