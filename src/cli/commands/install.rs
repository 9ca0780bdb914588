//! Install and reinstall commands

use crate::cli::args::{InstallArgs, ReinstallArgs};
use crate::cli::Services;
use crate::config::{Config, Preferences};
use crate::error::{CavernError, CavernResult};
use crate::install::{InstallReason, QueueInstallOptions};
use crate::model::{Build, Cave, Game, Upload};
use crate::paths::download_path;
use crate::store::RecordStore;
use crate::ui::{self, TaskOutcome, UiContext};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> CavernResult<()> {
    let services = Services::new(config, UiContext::detect());
    let prefs = services.runner.preferences();

    if let Some(ref location) = args.location {
        if !prefs.has_location(location) {
            return Err(CavernError::UnknownLocation(location.clone()));
        }
    }

    let filename = match (args.filename, args.file.as_deref()) {
        (Some(name), _) => name,
        (None, Some(file)) => file_name(file)?,
        (None, None) => {
            return Err(CavernError::InvalidRequest(
                "either --file or --filename is required".to_string(),
            ))
        }
    };

    let mut game = Game::new(
        args.game_id,
        args.title
            .unwrap_or_else(|| format!("Game {}", args.game_id)),
    );
    game.url = args.url;

    let mut upload = Upload::new(args.upload, filename);
    upload.channel_name = args.channel;
    upload.build_id = args.build_id;
    upload.build = args.build_id.map(|id| Build {
        id,
        user_version: args.user_version,
    });

    if let Some(ref file) = args.file {
        upload.size = Some(stage_archive(file, &upload, prefs).await?);
    }

    ui::intro(&services.ui, &format!("Installing {}", game.title));
    let opts = QueueInstallOptions {
        cave_id: None,
        game: game.clone(),
        upload,
        hand_picked: args.hand_picked,
        reason: InstallReason::Install,
        install_location: args.location,
    };

    let interrupt = services.cancel_on_interrupt();
    services
        .installer
        .install_as_task(&services.runner, opts)
        .await;
    interrupt.abort();

    if finish(&services, &game.title)? {
        if let Some(cave) = newest_install(&services.store.list_caves().await?, game.id) {
            ui::step_ok_detail(&services.ui, "Cave", &cave.id.to_string());
        }
        ui::outro_success(&services.ui, &format!("Installed {}", game.title));
    }
    Ok(())
}

/// Execute the reinstall command
pub async fn reinstall(args: ReinstallArgs, config: &Config) -> CavernResult<()> {
    let services = Services::new(config, UiContext::detect());

    let cave = services
        .store
        .find_cave(args.cave)
        .await?
        .ok_or(CavernError::CaveNotFound(args.cave))?;
    let upload = cave.upload.clone().ok_or_else(|| {
        CavernError::InvalidRequest(format!("cave {} has no upload to reinstall", cave.id))
    })?;

    if let Some(ref file) = args.file {
        stage_archive(file, &upload, services.runner.preferences()).await?;
    }

    ui::intro(&services.ui, &format!("Reinstalling {}", cave.game.title));
    let opts = QueueInstallOptions {
        cave_id: Some(cave.id),
        game: cave.game.clone(),
        upload,
        hand_picked: cave.hand_picked,
        reason: InstallReason::Reinstall,
        install_location: Some(cave.install_location.clone()),
    };

    let interrupt = services.cancel_on_interrupt();
    services
        .installer
        .install_as_task(&services.runner, opts)
        .await;
    interrupt.abort();

    if finish(&services, &cave.game.title)? {
        ui::outro_success(&services.ui, &format!("Reinstalled {}", cave.game.title));
    }
    Ok(())
}

/// Turn the task outcome into a command result
///
/// Returns `Ok(false)` when the install was deferred to a download.
fn finish(services: &Services, title: &str) -> CavernResult<bool> {
    match services.dispatch.last_outcome() {
        Some(TaskOutcome::Succeeded) => {
            let queued = services.dispatch.queued_downloads();
            if queued.is_empty() {
                return Ok(true);
            }
            for file in &queued {
                ui::step_warn_hint(
                    &services.ui,
                    &format!("{} is not downloaded", file),
                    "download queued; pass --file to install a local copy",
                );
            }
            ui::outro_warn(&services.ui, &format!("{} not installed yet", title));
            Ok(false)
        }
        Some(TaskOutcome::Failed(reason)) => Err(CavernError::install_failed(title, reason)),
        // Cancelled tasks end without an outcome
        None => Err(CavernError::Cancelled),
    }
}

/// The cave this command just installed: the game's latest completed install
fn newest_install(caves: &[Cave], game_id: u64) -> Option<&Cave> {
    caves
        .iter()
        .filter(|c| c.game_id == game_id)
        .filter_map(|c| c.installed_at.map(|at| (at, c)))
        .max_by_key(|(at, _)| *at)
        .map(|(_, c)| c)
}

fn file_name(file: &Path) -> CavernResult<String> {
    file.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CavernError::InvalidRequest(format!("{} has no file name", file.display()))
        })
}

/// Copy a local file to where the installer expects the upload's archive
async fn stage_archive(file: &Path, upload: &Upload, prefs: &Preferences) -> CavernResult<u64> {
    let target = download_path(upload, prefs);
    if target.as_path() == file {
        let meta = fs::metadata(file)
            .await
            .map_err(|e| CavernError::io(format!("reading {}", file.display()), e))?;
        return Ok(meta.len());
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| CavernError::io(format!("creating {}", parent.display()), e))?;
    }
    debug!("Staging {} as {}", file.display(), target.display());
    fs::copy(file, &target).await.map_err(|e| {
        CavernError::io(
            format!("copying {} to {}", file.display(), target.display()),
            e,
        )
    })
}
