//! Filesystem existence predicate

use async_trait::async_trait;
use std::path::Path;

/// Filesystem queries used by the install core
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Whether anything exists at `path`; IO errors count as "doesn't exist"
    async fn exists(&self, path: &Path) -> bool;
}

/// `FileSystem` backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl FileSystem for TokioFs {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}
