//! Table of live tasks
//!
//! Only the runner inserts and removes entries; everything else may look up
//! tasks or cancel them.

use crate::task::{Task, TaskContext};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// A task together with its context
#[derive(Debug, Clone)]
pub struct RegisteredTask {
    pub task: Task,
    pub context: TaskContext,
}

/// Live tasks keyed by task ID; cloning shares the table
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Arc<Mutex<HashMap<Uuid, RegisteredTask>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<Uuid, RegisteredTask>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a task; replaces any entry with the same ID
    pub fn register(&self, task: Task, context: TaskContext) {
        debug!("Registering task {} ({})", task.id, task.name);
        self.table()
            .insert(task.id, RegisteredTask { task, context });
    }

    /// Remove a task, returning it if it was registered
    pub fn unregister(&self, id: Uuid) -> Option<RegisteredTask> {
        let removed = self.table().remove(&id);
        if removed.is_some() {
            debug!("Unregistered task {}", id);
        }
        removed
    }

    /// Register a task until the returned guard is dropped
    pub(crate) fn register_scoped(&self, task: Task, context: TaskContext) -> Registration {
        let id = task.id;
        self.register(task, context);
        Registration {
            registry: self.clone(),
            id,
        }
    }

    /// Snapshot of running tasks, oldest first
    pub fn list(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.table().values().map(|r| r.task.clone()).collect();
        tasks.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        tasks
    }

    pub fn get(&self, id: Uuid) -> Option<RegisteredTask> {
        self.table().get(&id).cloned()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.table().contains_key(&id)
    }

    /// Running tasks touching a cave
    pub fn for_cave(&self, cave_id: Uuid) -> Vec<Task> {
        self.table()
            .values()
            .filter(|r| r.task.cave_id == Some(cave_id))
            .map(|r| r.task.clone())
            .collect()
    }

    /// Request cancellation; returns false if no such task is running
    pub fn cancel(&self, id: Uuid) -> bool {
        match self.table().get(&id) {
            Some(registered) => {
                registered.context.cancel();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}

/// Unregisters its task when dropped, including during unwinding
pub(crate) struct Registration {
    registry: TaskRegistry,
    id: Uuid,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}
