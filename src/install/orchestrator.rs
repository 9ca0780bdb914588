//! Install orchestration
//!
//! ```text
//! RESOLVE_CAVE ─┬─ CREATE_NEW ────┬─ VERIFY_ARTIFACT ─ EXTRACT ─ FINALIZE ─ SUCCESS
//!               └─ LOAD_EXISTING ─┘        │
//!                                          └─ archive missing: queue download, stop
//! ```
//!
//! A fresh install persists its cave before anything is extracted, so a
//! crash leaves an inspectable record. If a fresh install fails, the cave is
//! deleted again before the error propagates; reinstalls never touch the
//! existing record on failure.

use crate::config::schema::MAX_UNIQUE_NAME_ATTEMPTS;
use crate::dispatch::{Action, DownloadReason};
use crate::disk::FileSystem;
use crate::error::{CavernError, CavernResult};
use crate::install::folder::{ensure_unique_install_folder, install_folder_name};
use crate::install::locks::{CaveGuard, CaveLocks};
use crate::install::performer::{InstallPerformer, PerformInstall};
use crate::install::runtime::Runtime;
use crate::model::{version_name, Cave, CavePatch, Game, Upload};
use crate::paths::{app_path, download_path, install_root};
use crate::task::{TaskContext, TaskLogger, TaskName, TaskOptions, TaskRunner};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Why an install was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallReason {
    Install,
    Reinstall,
    Update,
    Heal,
}

impl fmt::Display for InstallReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Install => "install",
            Self::Reinstall => "reinstall",
            Self::Update => "update",
            Self::Heal => "heal",
        };
        write!(f, "{}", reason)
    }
}

/// Request for [`Installer::queue_install`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueInstallOptions {
    /// Existing cave to install into; `None` means a fresh install
    pub cave_id: Option<Uuid>,
    pub game: Game,
    pub upload: Upload,
    #[serde(default)]
    pub hand_picked: bool,
    pub reason: InstallReason,
    /// Install location name; the preferred default when `None`
    pub install_location: Option<String>,
}

/// Outcome of checking for the downloaded archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactCheck {
    Present,
    Missing,
}

/// Drives installs from request to finished cave
pub struct Installer {
    fs: Arc<dyn FileSystem>,
    performer: Arc<dyn InstallPerformer>,
    locks: CaveLocks,
    runtime: Runtime,
    unique_name_attempts: u32,
}

impl Installer {
    pub fn new(fs: Arc<dyn FileSystem>, performer: Arc<dyn InstallPerformer>) -> Self {
        Self {
            fs,
            performer,
            locks: CaveLocks::new(),
            runtime: Runtime::current(),
            unique_name_attempts: MAX_UNIQUE_NAME_ATTEMPTS,
        }
    }

    /// Cap on install folder suffix attempts
    pub fn with_unique_name_attempts(mut self, attempts: u32) -> Self {
        self.unique_name_attempts = attempts;
        self
    }

    /// Override the runtime handed to performers
    pub fn with_runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn locks(&self) -> &CaveLocks {
        &self.locks
    }

    pub(crate) fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Run [`queue_install`](Self::queue_install) as a tracked `install` task
    pub async fn install_as_task(&self, runner: &TaskRunner, opts: QueueInstallOptions) {
        let task = TaskOptions {
            name: TaskName::Install,
            game_id: opts.game.id,
            cave_id: opts.cave_id,
        };
        runner
            .run_as_task(task, |ctx, logger| async move {
                self.queue_install(&ctx, &logger, opts).await
            })
            .await;
    }

    /// Install or reinstall a game
    ///
    /// Resolves without error when the archive is missing: a download is
    /// queued instead and the install will be requested again afterwards.
    pub async fn queue_install(
        &self,
        ctx: &TaskContext,
        logger: &TaskLogger,
        opts: QueueInstallOptions,
    ) -> CavernResult<()> {
        logger
            .info(format!(
                "Doing {} for game {} ({})",
                opts.reason, opts.game.title, opts.game.id
            ))
            .await;

        let (cave, _guard, fresh) = self.resolve_cave(ctx, &opts).await?;

        let result = self.install_cave(ctx, logger, &opts, &cave, fresh).await;
        if let Err(ref e) = result {
            if e.is_cancelled() {
                logger.warn(format!("{} for {} cancelled", opts.reason, opts.game.title)).await;
            } else {
                logger
                    .error(format!("when doing {} for {}: {}", opts.reason, opts.game.title, e))
                    .await;
            }

            if fresh {
                logger.info("Was fresh install, removing cave record").await;
                if let Err(delete_err) = ctx.store().delete_cave(cave.id).await {
                    logger
                        .error(format!("Could not remove cave {}: {}", cave.id, delete_err))
                        .await;
                }
            }
        }
        result
    }

    /// RESOLVE_CAVE: load the addressed cave, or synthesize a fresh one
    async fn resolve_cave(
        &self,
        ctx: &TaskContext,
        opts: &QueueInstallOptions,
    ) -> CavernResult<(Cave, Option<CaveGuard>, bool)> {
        match opts.cave_id {
            Some(id) => {
                let guard = self.locks.acquire(id, ctx).await?;
                let cave = ctx
                    .store()
                    .find_cave(id)
                    .await?
                    .ok_or(CavernError::CaveNotFound(id))?;
                Ok((cave, Some(guard), false))
            }
            None if opts.reason == InstallReason::Reinstall => Err(CavernError::InvalidRequest(
                format!("Asked to {}, but no cave found", opts.reason),
            )),
            None => Ok((self.new_cave(ctx, opts).await, None, true)),
        }
    }

    /// CREATE_NEW: build the record for a fresh install (not persisted yet)
    async fn new_cave(&self, ctx: &TaskContext, opts: &QueueInstallOptions) -> Cave {
        let prefs = ctx.preferences();
        let install_location = opts
            .install_location
            .clone()
            .unwrap_or_else(|| prefs.default_location.clone());

        let mut cave = Cave::new(
            opts.game.clone(),
            opts.upload.clone(),
            install_location,
            install_folder_name(&opts.game),
            opts.hand_picked,
        );

        if opts.reason == InstallReason::Install {
            let root = install_root(&cave.install_location, cave.path_scheme, prefs);
            cave.install_folder = ensure_unique_install_folder(
                self.fs.as_ref(),
                &root,
                &cave.install_folder,
                self.unique_name_attempts,
            )
            .await;
        }

        cave
    }

    /// Everything after the cave is known; any error here triggers rollback
    /// of fresh installs
    async fn install_cave(
        &self,
        ctx: &TaskContext,
        logger: &TaskLogger,
        opts: &QueueInstallOptions,
        cave: &Cave,
        fresh: bool,
    ) -> CavernResult<()> {
        let upload = &opts.upload;

        if fresh {
            ctx.store().insert_cave(cave).await?;
        } else {
            logger
                .info(format!(
                    "← old version: {}",
                    version_name(cave.build_id, cave.build_user_version.as_deref())
                ))
                .await;
        }
        logger
            .info(format!(
                "→ new version: {}",
                version_name(upload.build_id, upload.user_version())
            ))
            .await;

        ctx.store().save_game(&opts.game).await?;

        let prefs = ctx.preferences();
        let dest_path = app_path(cave, prefs);
        let archive_path = download_path(upload, prefs);

        if self.verify_artifact(&archive_path).await == ArtifactCheck::Missing {
            logger.warn("Archive disappeared, redownloading...").await;
            ctx.dispatch().dispatch(Action::QueueDownload {
                cave_id: Some(cave.id),
                game: opts.game.clone(),
                upload: upload.clone(),
                hand_picked: opts.hand_picked,
                total_size: upload.size,
                incremental: false,
                reason: DownloadReason::Install,
            });
            return Ok(());
        }

        ctx.check_cancelled()?;

        self.performer
            .perform_install(PerformInstall {
                ctx,
                runtime: self.runtime,
                logger,
                dest_path: &dest_path,
                archive_path: &archive_path,
                cave_id: cave.id,
                upload,
            })
            .await?;

        ctx.store()
            .update_cave(cave.id, &CavePatch::installed(upload, Utc::now()))
            .await?;

        logger
            .info(format!("Installed {} to {}", opts.game.title, dest_path.display()))
            .await;
        Ok(())
    }

    /// VERIFY_ARTIFACT: never fails, a missing archive is an outcome
    async fn verify_artifact(&self, archive_path: &Path) -> ArtifactCheck {
        if self.fs.exists(archive_path).await {
            ArtifactCheck::Present
        } else {
            ArtifactCheck::Missing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;
    use crate::dispatch::CollectingDispatch;
    use crate::model::Build;
    use crate::store::{MemoryStore, RecordStore};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const ROOT: &str = "/games";

    /// Filesystem where only the listed paths exist
    #[derive(Default)]
    struct FakeFs {
        present: Mutex<HashSet<PathBuf>>,
    }

    impl FakeFs {
        fn with(paths: &[&str]) -> Self {
            let fs = Self::default();
            for p in paths {
                fs.present.lock().unwrap().insert(PathBuf::from(p));
            }
            fs
        }
    }

    #[async_trait]
    impl FileSystem for FakeFs {
        async fn exists(&self, path: &Path) -> bool {
            self.present.lock().unwrap().contains(path)
        }
    }

    /// Performer that records calls and optionally fails
    #[derive(Default)]
    struct FakePerformer {
        calls: AtomicUsize,
        fail: bool,
        dests: Mutex<Vec<PathBuf>>,
    }

    impl FakePerformer {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl InstallPerformer for FakePerformer {
        async fn perform_install(&self, opts: PerformInstall<'_>) -> CavernResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.dests.lock().unwrap().push(opts.dest_path.to_path_buf());
            if self.fail {
                return Err(CavernError::install_failed("test", "corrupted archive"));
            }
            Ok(())
        }
    }

    struct Harness {
        store: Arc<MemoryStore>,
        sink: Arc<CollectingDispatch>,
        performer: Arc<FakePerformer>,
        installer: Installer,
        ctx: TaskContext,
    }

    fn harness(fs: FakeFs, performer: FakePerformer) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(CollectingDispatch::new());
        let performer = Arc::new(performer);
        let mut prefs = Preferences::default();
        prefs
            .locations
            .insert("appdata".to_string(), PathBuf::from(ROOT));
        let ctx = TaskContext::detached(store.clone(), sink.clone(), Arc::new(prefs));
        let installer = Installer::new(Arc::new(fs), performer.clone());
        Harness {
            store,
            sink,
            performer,
            installer,
            ctx,
        }
    }

    fn bar_game() -> Game {
        Game::new(42, "Bar Game").with_url("https://foo.itch.io/bar-game")
    }

    fn upload() -> Upload {
        let mut upload = Upload::new(7, "bar-game.zip");
        upload.build_id = Some(12);
        upload.build = Some(Build {
            id: 12,
            user_version: Some("1.0".to_string()),
        });
        upload
    }

    fn fresh(reason: InstallReason) -> QueueInstallOptions {
        QueueInstallOptions {
            cave_id: None,
            game: bar_game(),
            upload: upload(),
            hand_picked: false,
            reason,
            install_location: None,
        }
    }

    const ARCHIVE: &str = "/games/downloads/7.zip";

    async fn existing_cave(store: &MemoryStore) -> Cave {
        let mut cave = Cave::new(
            bar_game(),
            Upload::new(3, "old.zip"),
            "appdata".to_string(),
            "bar-game".to_string(),
            true,
        );
        cave.build_id = Some(5);
        cave.installed_at = Some(Utc::now());
        store.insert_cave(&cave).await.unwrap();
        cave
    }

    #[tokio::test]
    async fn fresh_install_persists_and_finalizes() {
        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::default());

        h.installer
            .queue_install(&h.ctx, &TaskLogger::global(), fresh(InstallReason::Install))
            .await
            .unwrap();

        let caves = h.store.list_caves().await.unwrap();
        assert_eq!(caves.len(), 1);
        let cave = &caves[0];
        assert_eq!(cave.install_folder, "bar-game");
        assert_eq!(cave.install_location, "appdata");
        assert!(cave.is_installed());
        assert_eq!(cave.upload_id, Some(7));
        assert_eq!(cave.build_id, Some(12));
        assert_eq!(cave.build_user_version.as_deref(), Some("1.0"));

        assert_eq!(h.store.find_game(42).await.unwrap(), Some(bar_game()));
        assert_eq!(
            h.performer.dests.lock().unwrap().as_slice(),
            &[PathBuf::from("/games/apps/bar-game")]
        );
    }

    #[tokio::test]
    async fn colliding_folder_gets_suffix() {
        let h = harness(
            FakeFs::with(&[ARCHIVE, "/games/apps/bar-game"]),
            FakePerformer::default(),
        );

        h.installer
            .queue_install(&h.ctx, &TaskLogger::global(), fresh(InstallReason::Install))
            .await
            .unwrap();

        let cave = &h.store.list_caves().await.unwrap()[0];
        assert_eq!(cave.install_folder, "bar-game-2");
    }

    #[tokio::test]
    async fn only_plain_install_dedupes_folder() {
        let h = harness(
            FakeFs::with(&[ARCHIVE, "/games/apps/bar-game"]),
            FakePerformer::default(),
        );

        h.installer
            .queue_install(&h.ctx, &TaskLogger::global(), fresh(InstallReason::Update))
            .await
            .unwrap();

        let cave = &h.store.list_caves().await.unwrap()[0];
        assert_eq!(cave.install_folder, "bar-game");
    }

    #[tokio::test]
    async fn game_without_url_uses_id_folder() {
        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::default());
        let mut opts = fresh(InstallReason::Install);
        opts.game = Game::new(42, "Untitled");

        h.installer
            .queue_install(&h.ctx, &TaskLogger::global(), opts)
            .await
            .unwrap();

        assert_eq!(h.store.list_caves().await.unwrap()[0].install_folder, "game-42");
    }

    #[tokio::test]
    async fn explicit_location_is_kept() {
        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::default());
        let mut opts = fresh(InstallReason::Install);
        opts.install_location = Some("usb".to_string());

        h.installer
            .queue_install(&h.ctx, &TaskLogger::global(), opts)
            .await
            .unwrap();

        assert_eq!(h.store.list_caves().await.unwrap()[0].install_location, "usb");
    }

    #[tokio::test]
    async fn failed_fresh_install_rolls_back() {
        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::failing());

        let err = h
            .installer
            .queue_install(&h.ctx, &TaskLogger::global(), fresh(InstallReason::Install))
            .await
            .unwrap_err();

        assert!(matches!(err, CavernError::InstallFailed { .. }));
        assert_eq!(h.performer.calls.load(Ordering::SeqCst), 1);
        assert!(h.store.list_caves().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_fresh_install_rolls_back() {
        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::default());
        h.ctx.cancel();

        let err = h
            .installer
            .queue_install(&h.ctx, &TaskLogger::global(), fresh(InstallReason::Install))
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(h.performer.calls.load(Ordering::SeqCst), 0);
        assert!(h.store.list_caves().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_reinstall_leaves_cave_untouched() {
        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::failing());
        let cave = existing_cave(&h.store).await;

        let mut opts = fresh(InstallReason::Reinstall);
        opts.cave_id = Some(cave.id);
        let result = h
            .installer
            .queue_install(&h.ctx, &TaskLogger::global(), opts)
            .await;

        assert!(result.is_err());
        assert_eq!(h.store.find_cave(cave.id).await.unwrap(), Some(cave));
    }

    #[tokio::test]
    async fn reinstall_updates_existing_cave() {
        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::default());
        let cave = existing_cave(&h.store).await;

        let mut opts = fresh(InstallReason::Reinstall);
        opts.cave_id = Some(cave.id);
        h.installer
            .queue_install(&h.ctx, &TaskLogger::global(), opts)
            .await
            .unwrap();

        let updated = h.store.find_cave(cave.id).await.unwrap().unwrap();
        assert_eq!(updated.build_id, Some(12));
        assert_eq!(updated.upload_id, Some(7));
        assert_eq!(updated.install_folder, cave.install_folder);
        assert!(updated.hand_picked);
        assert!(updated.installed_at >= cave.installed_at);
        assert_eq!(h.store.list_caves().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reinstall_of_unversioned_upload_clears_old_version() {
        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::default());
        let mut cave = existing_cave(&h.store).await;
        cave.channel_name = Some("windows-beta".to_string());
        cave.build_user_version = Some("0.9".to_string());
        h.store.insert_cave(&cave).await.unwrap();

        let mut opts = fresh(InstallReason::Reinstall);
        opts.cave_id = Some(cave.id);
        opts.upload = Upload::new(7, "new.zip");
        h.installer
            .queue_install(&h.ctx, &TaskLogger::global(), opts)
            .await
            .unwrap();

        let updated = h.store.find_cave(cave.id).await.unwrap().unwrap();
        assert_eq!(updated.upload_id, Some(7));
        assert_eq!(updated.build_id, None);
        assert_eq!(updated.build_user_version, None);
        assert_eq!(updated.channel_name, None);
    }

    #[tokio::test]
    async fn reinstall_without_cave_is_rejected() {
        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::default());

        let err = h
            .installer
            .queue_install(&h.ctx, &TaskLogger::global(), fresh(InstallReason::Reinstall))
            .await
            .unwrap_err();

        assert!(matches!(err, CavernError::InvalidRequest(_)));
        assert!(h.store.list_caves().await.unwrap().is_empty());
        assert_eq!(h.store.find_game(42).await.unwrap(), None);
        assert_eq!(h.performer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_cave_is_not_found() {
        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::default());
        let id = Uuid::new_v4();
        let mut opts = fresh(InstallReason::Install);
        opts.cave_id = Some(id);

        let err = h
            .installer
            .queue_install(&h.ctx, &TaskLogger::global(), opts)
            .await
            .unwrap_err();

        assert!(matches!(err, CavernError::CaveNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn missing_archive_queues_one_download() {
        let h = harness(FakeFs::default(), FakePerformer::default());

        h.installer
            .queue_install(&h.ctx, &TaskLogger::global(), fresh(InstallReason::Install))
            .await
            .unwrap();

        assert_eq!(h.sink.count("queue-download"), 1);
        assert_eq!(h.performer.calls.load(Ordering::SeqCst), 0);

        let caves = h.store.list_caves().await.unwrap();
        assert_eq!(caves.len(), 1);
        assert!(!caves[0].is_installed());

        match &h.sink.actions()[0] {
            Action::QueueDownload {
                cave_id,
                upload,
                incremental,
                reason,
                ..
            } => {
                assert_eq!(*cave_id, Some(caves[0].id));
                assert_eq!(upload.id, 7);
                assert!(!incremental);
                assert_eq!(*reason, DownloadReason::Install);
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_archive_on_reinstall_skips_finalize() {
        let h = harness(FakeFs::default(), FakePerformer::default());
        let cave = existing_cave(&h.store).await;

        let mut opts = fresh(InstallReason::Reinstall);
        opts.cave_id = Some(cave.id);
        h.installer
            .queue_install(&h.ctx, &TaskLogger::global(), opts)
            .await
            .unwrap();

        assert_eq!(h.sink.count("queue-download"), 1);
        assert_eq!(h.store.find_cave(cave.id).await.unwrap(), Some(cave));
    }

    #[tokio::test]
    async fn install_as_task_reports_through_runner() {
        use crate::task::TaskRegistry;

        let h = harness(FakeFs::with(&[ARCHIVE]), FakePerformer::failing());
        let runner = TaskRunner::new(
            TaskRegistry::new(),
            h.store.clone(),
            h.sink.clone(),
            Arc::new(h.ctx.preferences().clone()),
        );

        h.installer
            .install_as_task(&runner, fresh(InstallReason::Install))
            .await;

        assert_eq!(h.sink.count("task-started"), 1);
        let ended: Vec<Option<String>> = h
            .sink
            .actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::TaskEnded { err, .. } => Some(err),
                _ => None,
            })
            .collect();
        assert_eq!(ended.len(), 1);
        assert!(ended[0].as_deref().unwrap().contains("corrupted archive"));
        assert!(h.store.list_caves().await.unwrap().is_empty());
        assert!(runner.registry().is_empty());
    }
}
