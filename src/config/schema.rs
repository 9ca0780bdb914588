//! Configuration schema for Cavern
//!
//! Configuration is stored at `~/.config/cavern/config.toml`

use crate::config::ConfigManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name of the install location that always exists
pub const APPDATA_LOCATION: &str = "appdata";

/// Default window for forwarded progress notifications
pub const DEFAULT_PROGRESS_THROTTLE_MS: u64 = 250;

/// Number of suffixes tried before accepting a colliding install folder
pub const MAX_UNIQUE_NAME_ATTEMPTS: u32 = 1200;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Install preferences
    pub install: Preferences,

    /// Task runner settings
    pub tasks: TaskConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Write per-cave log files
    pub cave_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            cave_logs: true,
        }
    }
}

/// Install-time preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Install location used when a request doesn't name one
    pub default_location: String,

    /// Named install locations (name -> root directory)
    pub locations: BTreeMap<String, PathBuf>,

    /// Where downloaded archives live (defaults to `<default location>/downloads`)
    pub downloads_dir: Option<PathBuf>,
}

impl Default for Preferences {
    fn default() -> Self {
        let mut locations = BTreeMap::new();
        locations.insert(APPDATA_LOCATION.to_string(), ConfigManager::data_dir());
        Self {
            default_location: APPDATA_LOCATION.to_string(),
            locations,
            downloads_dir: None,
        }
    }
}

/// Task runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Minimum interval between forwarded progress events
    pub progress_throttle_ms: u64,

    /// Cap on install folder suffix attempts
    pub unique_name_attempts: u32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            progress_throttle_ms: DEFAULT_PROGRESS_THROTTLE_MS,
            unique_name_attempts: MAX_UNIQUE_NAME_ATTEMPTS,
        }
    }
}
