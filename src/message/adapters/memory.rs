//! In-memory implementation of the [`MessageRepository`] port.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::message::{
    domain::{MessageId, TaskMessage},
    ports::{MessageRepository, MessageRepositoryError, MessageRepositoryResult},
};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{TaskId, TaskStatus},
};

/// Thread-safe in-memory message repository.
///
/// When built with [`InMemoryMessageRepository::sharing_tasks`], appends
/// re-check the owning task under the task store's lock, so a concurrent
/// close cannot slip between the service check and the write. A standalone
/// repository leaves that check to the service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageRepository {
    state: Arc<RwLock<InMemoryMessageState>>,
    tasks: Option<InMemoryTaskRepository>,
}

#[derive(Debug, Default)]
struct InMemoryMessageState {
    ids: HashSet<MessageId>,
    by_task: HashMap<TaskId, Vec<TaskMessage>>,
}

impl InMemoryMessageRepository {
    /// Creates an empty repository that does not see task rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository that re-checks the owning task in
    /// `tasks` on every append.
    #[must_use]
    pub fn sharing_tasks(tasks: &InMemoryTaskRepository) -> Self {
        Self {
            state: Arc::default(),
            tasks: Some(tasks.clone()),
        }
    }

    fn push(&self, message: &TaskMessage) -> MessageRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            MessageRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.ids.insert(message.id()) {
            return Err(MessageRepositoryError::DuplicateMessage(message.id()));
        }
        state
            .by_task
            .entry(message.task_id())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    fn push_if_open(
        &self,
        tasks: &InMemoryTaskRepository,
        message: &TaskMessage,
    ) -> MessageRepositoryResult<()> {
        let task_id = message.task_id();
        tasks
            .with_status(task_id, |status| match status {
                None => Err(MessageRepositoryError::TaskMissing(task_id)),
                Some(TaskStatus::Closed) => Err(MessageRepositoryError::TaskClosed(task_id)),
                Some(_) => self.push(message),
            })
            .map_err(MessageRepositoryError::persistence)?
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, message: &TaskMessage) -> MessageRepositoryResult<()> {
        self.tasks.as_ref().map_or_else(
            || self.push(message),
            |tasks| self.push_if_open(tasks, message),
        )
    }

    async fn find_by_task_id(&self, task_id: TaskId) -> MessageRepositoryResult<Vec<TaskMessage>> {
        let state = self.state.read().map_err(|err| {
            MessageRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut messages = state.by_task.get(&task_id).cloned().unwrap_or_default();
        // Stable: equal timestamps keep insertion order.
        messages.sort_by_key(TaskMessage::created_at);
        Ok(messages)
    }
}
