//! Task runner
//!
//! Wraps a unit of async work with the task lifecycle:
//! `task-started` → registered while running → `task-ended`. Failures are
//! absorbed here; a cancelled task ends silently.

use crate::config::{Config, Preferences};
use crate::dispatch::{Action, Dispatch};
use crate::error::CavernResult;
use crate::store::RecordStore;
use crate::task::{ProgressForwarder, Task, TaskContext, TaskLogger, TaskName, TaskRegistry};
use chrono::Utc;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// What is being run and for which game/cave
#[derive(Debug, Clone, Copy)]
pub struct TaskOptions {
    pub name: TaskName,
    pub game_id: u64,
    pub cave_id: Option<Uuid>,
}

pub struct TaskRunner {
    registry: TaskRegistry,
    store: Arc<dyn RecordStore>,
    dispatch: Arc<dyn Dispatch>,
    preferences: Arc<Preferences>,
    throttle: Duration,
    logs_dir: Option<PathBuf>,
}

impl TaskRunner {
    pub fn new(
        registry: TaskRegistry,
        store: Arc<dyn RecordStore>,
        dispatch: Arc<dyn Dispatch>,
        preferences: Arc<Preferences>,
    ) -> Self {
        Self {
            registry,
            store,
            dispatch,
            preferences,
            throttle: Duration::from_millis(crate::config::schema::DEFAULT_PROGRESS_THROTTLE_MS),
            logs_dir: None,
        }
    }

    /// Create a runner configured from the config file
    pub fn from_config(
        config: &Config,
        registry: TaskRegistry,
        store: Arc<dyn RecordStore>,
        dispatch: Arc<dyn Dispatch>,
        logs_dir: PathBuf,
    ) -> Self {
        let runner = Self::new(registry, store, dispatch, Arc::new(config.install.clone()))
            .with_throttle(Duration::from_millis(config.tasks.progress_throttle_ms));
        if config.general.cave_logs {
            runner.with_logs_dir(logs_dir)
        } else {
            runner
        }
    }

    /// Minimum interval between forwarded progress actions
    pub fn with_throttle(mut self, interval: Duration) -> Self {
        self.throttle = interval;
        self
    }

    /// Enable per-cave log files under `dir`
    pub fn with_logs_dir(mut self, dir: PathBuf) -> Self {
        self.logs_dir = Some(dir);
        self
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Run `work` as a tracked task
    ///
    /// Resolves once the end bookkeeping is done and never fails: errors from
    /// `work` are logged and reported through `task-ended`.
    pub async fn run_as_task<F, Fut>(&self, opts: TaskOptions, work: F)
    where
        F: FnOnce(TaskContext, TaskLogger) -> Fut,
        Fut: Future<Output = CavernResult<()>>,
    {
        let id = Uuid::new_v4();
        let TaskOptions {
            name,
            game_id,
            cave_id,
        } = opts;

        let logger = match cave_id {
            Some(cave_id) => TaskLogger::for_cave(cave_id, self.logs_dir.as_deref()),
            None => TaskLogger::global(),
        };

        let started_at = Utc::now();
        self.dispatch.dispatch(Action::TaskStarted {
            id,
            name,
            game_id,
            started_at,
        });

        let (progress_tx, forwarder) =
            ProgressForwarder::spawn(id, self.dispatch.clone(), self.throttle);
        let ctx = TaskContext::new(
            id,
            self.store.clone(),
            self.dispatch.clone(),
            self.preferences.clone(),
            Some(progress_tx),
        );

        let task = Task {
            id,
            name,
            game_id,
            cave_id,
            started_at,
        };

        let result = {
            let _registration = self.registry.register_scoped(task, ctx.clone());
            work(ctx, logger).await
        };

        forwarder.finish().await;

        let err = match result {
            Ok(()) => None,
            Err(e) if e.is_cancelled() => {
                debug!("Task {} {} cancelled", name, id);
                return;
            }
            Err(e) => {
                warn!("Task {} threw: {}", name, e);
                Some(e.to_string())
            }
        };

        self.dispatch.dispatch(Action::TaskEnded { id, err });
    }

    /// Fire-and-forget variant of [`run_as_task`](Self::run_as_task)
    pub fn spawn_task<F, Fut>(self: &Arc<Self>, opts: TaskOptions, work: F) -> JoinHandle<()>
    where
        F: FnOnce(TaskContext, TaskLogger) -> Fut + Send + 'static,
        Fut: Future<Output = CavernResult<()>> + Send + 'static,
    {
        let runner = Arc::clone(self);
        tokio::spawn(async move { runner.run_as_task(opts, work).await })
    }
}
