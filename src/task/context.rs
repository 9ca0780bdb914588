//! Per-task context
//!
//! The context is the only channel nested work uses to reach the store,
//! report progress or observe cancellation. It is cheap to clone and must be
//! passed explicitly to every call that can suspend.

use crate::config::Preferences;
use crate::dispatch::{Dispatch, ProgressInfo};
use crate::error::{CavernError, CavernResult};
use crate::store::RecordStore;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Clone)]
pub struct TaskContext {
    task_id: Uuid,
    store: Arc<dyn RecordStore>,
    dispatch: Arc<dyn Dispatch>,
    preferences: Arc<Preferences>,
    progress: Option<mpsc::UnboundedSender<ProgressInfo>>,
    cancel: CancellationToken,
}

impl TaskContext {
    /// Create a context whose progress goes to `progress`
    pub fn new(
        task_id: Uuid,
        store: Arc<dyn RecordStore>,
        dispatch: Arc<dyn Dispatch>,
        preferences: Arc<Preferences>,
        progress: Option<mpsc::UnboundedSender<ProgressInfo>>,
    ) -> Self {
        Self {
            task_id,
            store,
            dispatch,
            preferences,
            progress,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a context outside of any runner; progress is discarded
    pub fn detached(
        store: Arc<dyn RecordStore>,
        dispatch: Arc<dyn Dispatch>,
        preferences: Arc<Preferences>,
    ) -> Self {
        Self::new(Uuid::new_v4(), store, dispatch, preferences, None)
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn dispatch(&self) -> &dyn Dispatch {
        self.dispatch.as_ref()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Report progress; never blocks, dropped silently once the task ended
    pub fn emit_progress(&self, info: ProgressInfo) {
        if let Some(ref tx) = self.progress {
            let _ = tx.send(info);
        }
    }

    /// Request cooperative cancellation of this task
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token that resolves when the task is cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fail with `Cancelled` if cancellation was requested
    pub fn check_cancelled(&self) -> CavernResult<()> {
        if self.is_cancelled() {
            return Err(CavernError::Cancelled);
        }
        Ok(())
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("task_id", &self.task_id)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
