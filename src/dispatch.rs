//! Actions emitted by the install core and the sinks that receive them

use crate::model::{Game, Upload};
use crate::task::TaskName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// Progress snapshot reported by running work
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressInfo {
    /// Completion ratio in `0.0..=1.0`
    pub progress: f64,

    /// Estimated seconds remaining
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<f64>,

    /// Bytes per second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bps: Option<f64>,

    /// What the work is currently doing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl ProgressInfo {
    pub fn new(progress: f64) -> Self {
        Self {
            progress: progress.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }
}

/// Why a download was queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadReason {
    Install,
    Reinstall,
    Update,
}

/// Everything the core reports to the outside world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    TaskStarted {
        id: Uuid,
        name: TaskName,
        game_id: u64,
        started_at: DateTime<Utc>,
    },
    TaskProgress {
        id: Uuid,
        #[serde(flatten)]
        info: ProgressInfo,
    },
    TaskEnded {
        id: Uuid,
        err: Option<String>,
    },
    QueueDownload {
        cave_id: Option<Uuid>,
        game: Game,
        upload: Upload,
        hand_picked: bool,
        total_size: Option<u64>,
        incremental: bool,
        reason: DownloadReason,
    },
}

impl Action {
    /// Kebab-case action type, as serialized
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TaskStarted { .. } => "task-started",
            Self::TaskProgress { .. } => "task-progress",
            Self::TaskEnded { .. } => "task-ended",
            Self::QueueDownload { .. } => "queue-download",
        }
    }
}

/// Sink for actions; must not block
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, action: Action);
}

/// Sink that logs every action through tracing
#[derive(Debug, Default)]
pub struct TracingDispatch;

impl Dispatch for TracingDispatch {
    fn dispatch(&self, action: Action) {
        match action {
            Action::TaskStarted { id, name, game_id, .. } => {
                tracing::info!("Task {} started: {} for game {}", id, name, game_id);
            }
            Action::TaskProgress { id, info } => {
                tracing::debug!("Task {} at {:.0}%", id, info.progress * 100.0);
            }
            Action::TaskEnded { id, err: None } => {
                tracing::info!("Task {} ended", id);
            }
            Action::TaskEnded { id, err: Some(err) } => {
                tracing::error!("Task {} failed: {}", id, err);
            }
            Action::QueueDownload { game, upload, .. } => {
                tracing::info!(
                    "Download queued for {} (upload {}, {})",
                    game.title,
                    upload.id,
                    upload.filename
                );
            }
        }
    }
}

/// Sink that keeps every action for later inspection
#[derive(Debug, Default)]
pub struct CollectingDispatch {
    actions: Mutex<Vec<Action>>,
}

impl CollectingDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected actions, in dispatch order
    pub fn actions(&self) -> Vec<Action> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of collected actions of a kind (see [`Action::kind`])
    pub fn count(&self, kind: &str) -> usize {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|a| a.kind() == kind)
            .count()
    }
}

impl Dispatch for CollectingDispatch {
    fn dispatch(&self, action: Action) {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);
    }
}
