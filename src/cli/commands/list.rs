//! List command - show caves

use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::CavernResult;
use crate::model::{version_name, Cave};
use crate::store::{JsonStore, RecordStore};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, _config: &Config) -> CavernResult<()> {
    let store = JsonStore::new(ConfigManager::db_dir());
    let caves = store.list_caves().await?;

    let filtered: Vec<Cave> = if args.all {
        caves
    } else {
        caves.into_iter().filter(Cave::is_installed).collect()
    };

    if filtered.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No caves installed");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&filtered),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&filtered)?),
        OutputFormat::Plain => {
            for cave in &filtered {
                println!("{}", cave.id);
            }
        }
    }

    Ok(())
}

fn print_table(caves: &[Cave]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Caves");

    println!(
        "{:<36}  {:<24} {:<20} {:<16}",
        style("ID").bold(),
        style("GAME").bold(),
        style("VERSION").bold(),
        style("INSTALLED").bold()
    );
    println!("{}", "-".repeat(100));

    for cave in caves {
        let installed = match cave.installed_at {
            Some(at) => style(at.format("%Y-%m-%d %H:%M").to_string()).green(),
            None => style("pending".to_string()).yellow(),
        };
        let version = version_name(cave.build_id, cave.build_user_version.as_deref());

        println!(
            "{:<36}  {:<24} {:<20} {:<16}",
            cave.id,
            truncate(&cave.game.title, 24),
            truncate(&version, 20),
            installed
        );
    }

    println!();
    println!("{} cave(s)", caves.len());
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
