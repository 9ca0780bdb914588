//! Cavern - install games into caves
//!
//! CLI entry point that dispatches to subcommands.

use cavern::cli::{commands, Cli, Commands};
use cavern::config::{Config, ConfigManager};
use cavern::error::CavernResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CavernResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());
    cavern::ui::init_theme(&cavern::ui::UiContext::detect());

    ConfigManager::ensure_state_dirs().await?;

    match cli.command {
        Commands::Install(args) => commands::install(args, &config).await,
        Commands::Reinstall(args) => commands::reinstall(args, &config).await,
        Commands::Uninstall(args) => commands::uninstall(args, &config).await,
        Commands::List(args) => commands::list(args, &config).await,
        Commands::Show(args) => commands::show(args, &config).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
    }
}

/// 0 = warn (bars only), 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("cavern=warn"),
        1 => EnvFilter::new("cavern=info"),
        _ => EnvFilter::new("cavern=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
