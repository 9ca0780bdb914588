//! Uninstall command - remove a cave and its files

use crate::cli::args::UninstallArgs;
use crate::cli::Services;
use crate::config::Config;
use crate::error::{CavernError, CavernResult};
use crate::paths::app_path;
use crate::store::RecordStore;
use crate::ui::{self, TaskOutcome, UiContext};

/// Execute the uninstall command
pub async fn execute(args: UninstallArgs, config: &Config) -> CavernResult<()> {
    let services = Services::new(config, UiContext::detect().with_auto_yes(args.yes));

    let cave = services
        .store
        .find_cave(args.cave)
        .await?
        .ok_or(CavernError::CaveNotFound(args.cave))?;
    let dest = app_path(&cave, services.runner.preferences());

    let question = format!("Remove {} from {}?", cave.game.title, dest.display());
    if !ui::confirm(&services.ui, &question, false).await? {
        ui::step_info(&services.ui, "Nothing removed; pass --yes to skip this prompt");
        return Ok(());
    }

    let interrupt = services.cancel_on_interrupt();
    services
        .installer
        .uninstall_as_task(&services.runner, cave.game_id, cave.id)
        .await;
    interrupt.abort();

    match services.dispatch.last_outcome() {
        Some(TaskOutcome::Succeeded) => {
            ui::step_ok_detail(&services.ui, "Removed", &dest.display().to_string());
            ui::outro_success(&services.ui, &format!("Uninstalled {}", cave.game.title));
            Ok(())
        }
        Some(TaskOutcome::Failed(reason)) => Err(CavernError::Internal(format!(
            "Uninstalling {} failed: {}",
            cave.game.title, reason
        ))),
        None => Err(CavernError::Cancelled),
    }
}
