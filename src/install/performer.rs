//! Install performers: the routines that turn a downloaded file into an
//! installed folder.

use crate::dispatch::ProgressInfo;
use crate::error::{CavernError, CavernResult};
use crate::install::runtime::Runtime;
use crate::model::Upload;
use crate::task::{TaskContext, TaskLogger};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

/// Arguments for one install
pub struct PerformInstall<'a> {
    /// Progress and cancellation go through here
    pub ctx: &'a TaskContext,
    pub runtime: Runtime,
    pub logger: &'a TaskLogger,
    /// Install folder to fill
    pub dest_path: &'a Path,
    /// Downloaded file
    pub archive_path: &'a Path,
    pub cave_id: Uuid,
    pub upload: &'a Upload,
}

/// Unpacks or copies a downloaded upload into its install folder
///
/// Implementations report progress through `opts.ctx`, check cancellation at
/// their own suspension points and fail with an ordinary error otherwise.
#[async_trait]
pub trait InstallPerformer: Send + Sync {
    async fn perform_install(&self, opts: PerformInstall<'_>) -> CavernResult<()>;
}

const COPY_CHUNK: usize = 64 * 1024;

/// Installs a single file as-is, without unpacking it
#[derive(Debug, Clone, Copy, Default)]
pub struct NakedInstaller;

impl NakedInstaller {
    /// Target file name: the upload's own name, stripped of any directories
    fn target_name(upload: &Upload) -> String {
        Path::new(&upload.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{}", upload.id))
    }

    async fn copy(opts: &PerformInstall<'_>, target: &Path) -> CavernResult<()> {
        let ctx = opts.ctx;
        let mut src = File::open(opts.archive_path).await.map_err(|e| {
            CavernError::io(format!("opening {}", opts.archive_path.display()), e)
        })?;
        let total = src
            .metadata()
            .await
            .map_err(|e| CavernError::io("reading archive metadata", e))?
            .len();

        let mut dst = File::create(target)
            .await
            .map_err(|e| CavernError::io(format!("creating {}", target.display()), e))?;

        let mut buf = vec![0u8; COPY_CHUNK];
        let mut copied: u64 = 0;
        loop {
            ctx.check_cancelled()?;

            let n = src
                .read(&mut buf)
                .await
                .map_err(|e| CavernError::io("reading archive", e))?;
            if n == 0 {
                break;
            }
            dst.write_all(&buf[..n])
                .await
                .map_err(|e| CavernError::io(format!("writing {}", target.display()), e))?;

            copied += n as u64;
            let ratio = if total > 0 {
                copied as f64 / total as f64
            } else {
                1.0
            };
            ctx.emit_progress(ProgressInfo::new(ratio).with_stage("copy"));
        }

        dst.flush()
            .await
            .map_err(|e| CavernError::io(format!("flushing {}", target.display()), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o755);
            fs::set_permissions(target, perms)
                .await
                .map_err(|e| CavernError::io("marking install executable", e))?;
        }

        Ok(())
    }
}

#[async_trait]
impl InstallPerformer for NakedInstaller {
    async fn perform_install(&self, opts: PerformInstall<'_>) -> CavernResult<()> {
        fs::create_dir_all(opts.dest_path).await.map_err(|e| {
            CavernError::io(format!("creating {}", opts.dest_path.display()), e)
        })?;

        let target: PathBuf = opts.dest_path.join(Self::target_name(opts.upload));
        opts.logger
            .info(format!(
                "Copying {} to {} ({})",
                opts.archive_path.display(),
                target.display(),
                opts.runtime
            ))
            .await;

        if let Err(e) = Self::copy(&opts, &target).await {
            // Never leave a truncated file behind
            let _ = fs::remove_file(&target).await;
            return Err(e);
        }

        opts.ctx
            .emit_progress(ProgressInfo::new(1.0).with_stage("copy"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;
    use crate::dispatch::CollectingDispatch;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn ctx_with_progress() -> (TaskContext, mpsc::UnboundedReceiver<ProgressInfo>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = TaskContext::new(
            Uuid::new_v4(),
            Arc::new(MemoryStore::new()),
            Arc::new(CollectingDispatch::new()),
            Arc::new(Preferences::default()),
            Some(tx),
        );
        (ctx, rx)
    }

    #[tokio::test]
    async fn copies_file_and_reports_progress() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("7.exe");
        let payload = vec![7u8; COPY_CHUNK * 2 + 10];
        tokio::fs::write(&archive, &payload).await.unwrap();
        let dest = temp.path().join("apps").join("bar-game");

        let (ctx, mut rx) = ctx_with_progress();
        let logger = TaskLogger::global();
        let upload = Upload::new(7, "Bar Game.exe");

        NakedInstaller
            .perform_install(PerformInstall {
                ctx: &ctx,
                runtime: Runtime::current(),
                logger: &logger,
                dest_path: &dest,
                archive_path: &archive,
                cave_id: Uuid::new_v4(),
                upload: &upload,
            })
            .await
            .unwrap();

        let copied = tokio::fs::read(dest.join("Bar Game.exe")).await.unwrap();
        assert_eq!(copied.len(), payload.len());

        let mut last = None;
        let mut count = 0;
        while let Ok(info) = rx.try_recv() {
            count += 1;
            last = Some(info.progress);
        }
        assert!(count >= 3);
        assert_eq!(last, Some(1.0));
    }

    #[tokio::test]
    async fn cancelled_copy_leaves_nothing() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("7.bin");
        tokio::fs::write(&archive, b"payload").await.unwrap();
        let dest = temp.path().join("apps").join("x");

        let (ctx, _rx) = ctx_with_progress();
        ctx.cancel();
        let logger = TaskLogger::global();
        let upload = Upload::new(7, "x.bin");

        let result = NakedInstaller
            .perform_install(PerformInstall {
                ctx: &ctx,
                runtime: Runtime::current(),
                logger: &logger,
                dest_path: &dest,
                archive_path: &archive,
                cave_id: Uuid::new_v4(),
                upload: &upload,
            })
            .await;

        assert!(matches!(result, Err(CavernError::Cancelled)));
        assert!(!dest.join("x.bin").exists());
    }

    #[tokio::test]
    async fn missing_archive_is_an_error() {
        let temp = TempDir::new().unwrap();
        let (ctx, _rx) = ctx_with_progress();
        let logger = TaskLogger::global();
        let upload = Upload::new(7, "x.bin");

        let result = NakedInstaller
            .perform_install(PerformInstall {
                ctx: &ctx,
                runtime: Runtime::current(),
                logger: &logger,
                dest_path: &temp.path().join("dest"),
                archive_path: &temp.path().join("gone.bin"),
                cave_id: Uuid::new_v4(),
                upload: &upload,
            })
            .await;

        assert!(matches!(result, Err(CavernError::Io { .. })));
    }

    #[test]
    fn target_name_strips_directories() {
        assert_eq!(
            NakedInstaller::target_name(&Upload::new(1, "../../evil.sh")),
            "evil.sh"
        );
        assert_eq!(NakedInstaller::target_name(&Upload::new(2, "..")), "upload-2");
    }
}
