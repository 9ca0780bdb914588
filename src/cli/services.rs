//! Wiring of the install core for one CLI invocation

use crate::config::{Config, ConfigManager};
use crate::disk::TokioFs;
use crate::install::{Installer, NakedInstaller};
use crate::store::JsonStore;
use crate::task::{TaskRegistry, TaskRunner};
use crate::ui::{ProgressDispatch, UiContext};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Store, runner and installer sharing one registry and one action sink
pub struct Services {
    pub ui: UiContext,
    pub store: Arc<JsonStore>,
    pub dispatch: Arc<ProgressDispatch>,
    pub runner: TaskRunner,
    pub installer: Installer,
}

impl Services {
    pub fn new(config: &Config, ui: UiContext) -> Self {
        let store = Arc::new(JsonStore::new(ConfigManager::db_dir()));
        let dispatch = Arc::new(ProgressDispatch::new(&ui));
        let runner = TaskRunner::from_config(
            config,
            TaskRegistry::new(),
            store.clone(),
            dispatch.clone(),
            ConfigManager::logs_dir(),
        );
        let installer = Installer::new(Arc::new(TokioFs), Arc::new(NakedInstaller))
            .with_unique_name_attempts(config.tasks.unique_name_attempts);

        Self {
            ui,
            store,
            dispatch,
            runner,
            installer,
        }
    }

    /// Cancel every running task on Ctrl-C
    ///
    /// The returned handle should be aborted once the command is done.
    pub fn cancel_on_interrupt(&self) -> JoinHandle<()> {
        let registry = self.runner.registry().clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling {} task(s)", registry.len());
                for task in registry.list() {
                    registry.cancel(task.id);
                }
            }
        })
    }
}
