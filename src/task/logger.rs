//! Task-scoped logging
//!
//! Every message goes through `tracing` inside the task's span. Cave-scoped
//! loggers also append JSON lines to the cave's own log file, so the history
//! of an install survives the process.

use crate::paths::cave_log_path;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{info_span, warn, Level, Span};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TaskLogger {
    span: Span,
    file: Option<PathBuf>,
}

impl TaskLogger {
    /// Logger for work that isn't attached to a cave yet
    pub fn global() -> Self {
        Self {
            span: info_span!("task"),
            file: None,
        }
    }

    /// Logger writing to the cave's log stream; `logs_dir = None` keeps it
    /// tracing-only
    pub fn for_cave(cave_id: Uuid, logs_dir: Option<&Path>) -> Self {
        Self {
            span: info_span!("cave", id = %cave_id),
            file: logs_dir.map(|dir| cave_log_path(dir, cave_id)),
        }
    }

    /// Path of the cave log file, if this logger has one
    pub fn log_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub async fn debug(&self, message: impl AsRef<str>) {
        self.write(Level::DEBUG, message.as_ref()).await;
    }

    pub async fn info(&self, message: impl AsRef<str>) {
        self.write(Level::INFO, message.as_ref()).await;
    }

    pub async fn warn(&self, message: impl AsRef<str>) {
        self.write(Level::WARN, message.as_ref()).await;
    }

    pub async fn error(&self, message: impl AsRef<str>) {
        self.write(Level::ERROR, message.as_ref()).await;
    }

    async fn write(&self, level: Level, message: &str) {
        self.span.in_scope(|| {
            if level == Level::ERROR {
                tracing::error!("{}", message);
            } else if level == Level::WARN {
                tracing::warn!("{}", message);
            } else if level == Level::INFO {
                tracing::info!("{}", message);
            } else {
                tracing::debug!("{}", message);
            }
        });

        let Some(ref path) = self.file else {
            return;
        };

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level.as_str().to_lowercase(),
            "message": message,
        });
        let mut line = entry.to_string();
        line.push('\n');

        // A broken log file must never fail the install itself
        if let Err(e) = append(path, &line).await {
            warn!("Failed to write cave log {}: {}", path.display(), e);
        }
    }
}

async fn append(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;

    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
