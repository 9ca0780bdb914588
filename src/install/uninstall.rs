//! Uninstall: remove a cave's files, then its record

use crate::dispatch::ProgressInfo;
use crate::error::{CavernError, CavernResult};
use crate::install::orchestrator::Installer;
use crate::paths::app_path;
use crate::task::{TaskContext, TaskLogger, TaskName, TaskOptions, TaskRunner};
use uuid::Uuid;

impl Installer {
    /// Run [`queue_uninstall`](Self::queue_uninstall) as a tracked
    /// `uninstall` task
    pub async fn uninstall_as_task(&self, runner: &TaskRunner, game_id: u64, cave_id: Uuid) {
        let task = TaskOptions {
            name: TaskName::Uninstall,
            game_id,
            cave_id: Some(cave_id),
        };
        runner
            .run_as_task(task, |ctx, logger| async move {
                self.queue_uninstall(&ctx, &logger, cave_id).await
            })
            .await;
    }

    /// Delete a cave's install folder and record
    ///
    /// Once the folder is gone the record is deleted even if cancellation was
    /// requested meanwhile; a half-uninstalled cave is not kept around.
    pub async fn queue_uninstall(
        &self,
        ctx: &TaskContext,
        logger: &TaskLogger,
        cave_id: Uuid,
    ) -> CavernResult<()> {
        let _guard = self.locks().acquire(cave_id, ctx).await?;
        let cave = ctx
            .store()
            .find_cave(cave_id)
            .await?
            .ok_or(CavernError::CaveNotFound(cave_id))?;

        ctx.check_cancelled()?;

        let dest_path = app_path(&cave, ctx.preferences());
        if self.fs().exists(&dest_path).await {
            logger
                .info(format!("Removing {}", dest_path.display()))
                .await;
            tokio::fs::remove_dir_all(&dest_path).await.map_err(|e| {
                CavernError::io(format!("removing {}", dest_path.display()), e)
            })?;
        } else {
            logger
                .warn(format!("{} already gone", dest_path.display()))
                .await;
        }
        ctx.emit_progress(ProgressInfo::new(0.5).with_stage("remove"));

        ctx.store().delete_cave(cave_id).await?;
        ctx.emit_progress(ProgressInfo::new(1.0).with_stage("remove"));

        logger
            .info(format!("Uninstalled {} ({})", cave.game.title, cave_id))
            .await;
        Ok(())
    }
}
