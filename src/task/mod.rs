//! Task tracking: per-task context, live-task registry and the runner that
//! wraps async work with start/progress/end bookkeeping.

pub mod context;
pub mod logger;
pub mod registry;
pub mod runner;
pub mod throttle;

pub use context::TaskContext;
pub use logger::TaskLogger;
pub use registry::{RegisteredTask, TaskRegistry};
pub use runner::{TaskOptions, TaskRunner};
pub use throttle::ProgressForwarder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of tracked operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskName {
    Install,
    Launch,
    Uninstall,
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Install => "install",
            Self::Launch => "launch",
            Self::Uninstall => "uninstall",
        };
        write!(f, "{}", name)
    }
}

/// A running operation, as seen from outside
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: TaskName,
    pub game_id: u64,
    pub cave_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
}
