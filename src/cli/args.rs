//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;

/// Cavern - install games into caves
///
/// Installs, reinstalls and uninstalls downloaded games as tracked tasks,
/// keeping one cave record per installed copy.
#[derive(Parser, Debug)]
#[command(name = "cavern")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CAVERN_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a game into a new cave
    Install(InstallArgs),

    /// Reinstall an existing cave
    Reinstall(ReinstallArgs),

    /// Remove a cave and its files
    Uninstall(UninstallArgs),

    /// List caves
    List(ListArgs),

    /// Show one cave in detail
    Show(ShowArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Game ID
    pub game_id: u64,

    /// Game title (defaults to "Game <id>")
    #[arg(short, long)]
    pub title: Option<String>,

    /// Game page URL; its first path segment names the install folder
    #[arg(long)]
    pub url: Option<String>,

    /// Upload ID
    #[arg(short, long)]
    pub upload: u64,

    /// Local file to install; copied into the downloads directory first
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Upload file name (defaults to the name of --file)
    #[arg(long, required_unless_present = "file")]
    pub filename: Option<String>,

    /// Build ID of the upload
    #[arg(long)]
    pub build_id: Option<u64>,

    /// Version string of the build
    #[arg(long, requires = "build_id")]
    pub user_version: Option<String>,

    /// Release channel
    #[arg(long)]
    pub channel: Option<String>,

    /// Install location name (defaults to install.default_location)
    #[arg(short, long)]
    pub location: Option<String>,

    /// Mark the upload as explicitly chosen
    #[arg(long)]
    pub hand_picked: bool,
}

/// Arguments for the reinstall command
#[derive(Parser, Debug)]
pub struct ReinstallArgs {
    /// Cave ID
    pub cave: Uuid,

    /// Local file to install instead of the downloaded archive
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
pub struct UninstallArgs {
    /// Cave ID
    pub cave: Uuid,

    /// Don't ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Include caves whose install never completed
    #[arg(short, long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Cave ID
    pub cave: Uuid,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Number of cave log lines to show (0 = none)
    #[arg(short, long, default_value = "10")]
    pub lines: usize,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list and show
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Cave IDs only, one per line
    Plain,
}
