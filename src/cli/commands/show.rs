//! Show command - details and recent log of one cave

use crate::cli::args::{OutputFormat, ShowArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{CavernError, CavernResult};
use crate::model::{version_name, Cave};
use crate::paths::{app_path, cave_log_path};
use crate::store::{JsonStore, RecordStore};
use crate::ui::{self, UiContext};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// One line of a cave log file
#[derive(Debug, Deserialize)]
struct LogLine {
    timestamp: String,
    level: String,
    message: String,
}

/// Execute the show command
pub async fn execute(args: ShowArgs, config: &Config) -> CavernResult<()> {
    let store = JsonStore::new(ConfigManager::db_dir());
    let cave = store
        .find_cave(args.cave)
        .await?
        .ok_or(CavernError::CaveNotFound(args.cave))?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cave)?),
        OutputFormat::Plain => println!("{}", app_path(&cave, &config.install).display()),
        OutputFormat::Table => {
            print_details(&cave, config);
            if args.lines > 0 {
                let log = cave_log_path(&ConfigManager::logs_dir(), cave.id);
                print_log(&log, args.lines).await?;
            }
        }
    }

    Ok(())
}

fn print_details(cave: &Cave, config: &Config) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, &cave.game.title);

    ui::key_value(&ctx, "cave", &cave.id.to_string());
    ui::key_value(&ctx, "game", &cave.game_id.to_string());
    if let Some(ref url) = cave.game.url {
        ui::key_value(&ctx, "url", url);
    }
    ui::key_value(
        &ctx,
        "version",
        &version_name(cave.build_id, cave.build_user_version.as_deref()),
    );
    if let Some(ref channel) = cave.channel_name {
        ui::key_value(&ctx, "channel", channel);
    }
    if let Some(ref upload) = cave.upload {
        ui::key_value(&ctx, "upload", &format!("{} (#{})", upload.filename, upload.id));
    }
    let installed = cave
        .installed_at
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "pending".to_string());
    ui::key_value(&ctx, "installed", &installed);
    if cave.hand_picked {
        ui::key_value(&ctx, "hand-picked", "yes");
    }

    ui::section(&ctx, "Location");
    ui::key_value(&ctx, "location", &cave.install_location);
    ui::key_value(&ctx, "folder", &cave.install_folder);
    ui::key_value(
        &ctx,
        "path",
        &app_path(cave, &config.install).display().to_string(),
    );
}

async fn print_log(path: &Path, lines: usize) -> CavernResult<()> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(CavernError::io(format!("reading {}", path.display()), e)),
    };

    let ctx = UiContext::detect();
    ui::section(&ctx, "Recent log");
    for line in tail(&content, lines) {
        println!("  {}", line);
    }
    Ok(())
}

/// Last `n` log entries, formatted; lines that aren't log entries are shown raw
fn tail(content: &str, n: usize) -> Vec<String> {
    let all: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    all[all.len().saturating_sub(n)..]
        .iter()
        .map(|raw| match serde_json::from_str::<LogLine>(raw) {
            Ok(entry) => format!("{} {:<5} {}", entry.timestamp, entry.level, entry.message),
            Err(_) => raw.to_string(),
        })
        .collect()
}
