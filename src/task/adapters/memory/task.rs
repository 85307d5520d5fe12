//! In-memory repository for task lifecycle tests and single-process use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{SubtreeSnapshot, Task, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// A single `RwLock` serialises every write, so guarded commits validate
/// and apply under the same lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    insertion_order: Vec<TaskId>,
    children_index: HashMap<TaskId, Vec<TaskId>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a task without parent validation.
    ///
    /// Lets tests seed hierarchies that the public API refuses to build,
    /// such as a child under an already-closed parent or a parent cycle.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the identifier
    /// already exists.
    pub fn insert_unchecked(&self, task: Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.insert(task);
        Ok(())
    }

    /// Calls `f` with the current status of `id` while holding the read
    /// lock, so no task write interleaves with `f`.
    pub(crate) fn with_status<T>(
        &self,
        id: TaskId,
        f: impl FnOnce(Option<TaskStatus>) -> T,
    ) -> TaskRepositoryResult<T> {
        let state = self.read()?;
        Ok(f(state.tasks.get(&id).map(Task::status)))
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryTaskState {
    fn insert(&mut self, task: Task) {
        if let Some(parent_id) = task.parent_id() {
            self.children_index
                .entry(parent_id)
                .or_default()
                .push(task.id());
        }
        self.insertion_order.push(task.id());
        self.tasks.insert(task.id(), task);
    }

    fn children(&self, parent_id: TaskId) -> Vec<Task> {
        self.children_index
            .get(&parent_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks that `task` is exactly one version ahead of the stored row.
    fn check_version(&self, task: &Task) -> TaskRepositoryResult<()> {
        let stored = self
            .tasks
            .get(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        let expected = task.version().saturating_sub(1);
        if stored.version() != expected {
            return Err(TaskRepositoryError::VersionConflict {
                task_id: task.id(),
                expected,
                actual: stored.version(),
            });
        }
        Ok(())
    }

    /// Re-validates a closure snapshot against current state.
    fn check_snapshot(&self, snapshot: &SubtreeSnapshot) -> TaskRepositoryResult<()> {
        let root = snapshot.root();
        for (id, version) in snapshot.descendants() {
            let unchanged = self
                .tasks
                .get(&id)
                .is_some_and(|stored| stored.version() == version);
            if !unchanged {
                return Err(TaskRepositoryError::SubtreeChanged { root, changed: id });
            }
        }

        for parent_id in snapshot.parents() {
            let unseen_child = self
                .children_index
                .get(&parent_id)
                .into_iter()
                .flatten()
                .find(|child_id| !snapshot.covers(**child_id));
            if let Some(child_id) = unseen_child {
                return Err(TaskRepositoryError::SubtreeChanged {
                    root,
                    changed: *child_id,
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }

        if let Some(parent_id) = task.parent_id() {
            let parent = state
                .tasks
                .get(&parent_id)
                .ok_or(TaskRepositoryError::ParentMissing(parent_id))?;
            if parent.is_closed() {
                return Err(TaskRepositoryError::ParentClosed(parent_id));
            }
        }

        state.insert(task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.check_version(task)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_guarded(
        &self,
        task: &Task,
        snapshot: &SubtreeSnapshot,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.check_version(task)?;
        state.check_snapshot(snapshot)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_parent_id(&self, parent_id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state.children(parent_id))
    }

    async fn find_children_of(&self, parent_ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(parent_ids
            .iter()
            .flat_map(|parent_id| state.children(*parent_id))
            .collect())
    }

    async fn find_roots(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .insertion_order
            .iter()
            .filter_map(|id| state.tasks.get(id))
            .filter(|task| task.is_root())
            .cloned()
            .collect())
    }

    async fn exists_by_id(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        let state = self.read()?;
        Ok(state.tasks.contains_key(&id))
    }
}
