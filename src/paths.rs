//! Where caves and downloads live on disk

use crate::config::schema::{Preferences, APPDATA_LOCATION};
use crate::config::ConfigManager;
use crate::model::{Cave, PathScheme, Upload};
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

impl Preferences {
    /// Root directory of a named install location
    ///
    /// Unknown names fall back to the default location so that path
    /// computation never fails halfway through an install.
    pub fn location_root(&self, name: &str) -> PathBuf {
        if let Some(root) = self.locations.get(name) {
            return root.clone();
        }
        if name != self.default_location {
            warn!(
                "Install location {:?} not configured, using {:?}",
                name, self.default_location
            );
            if let Some(root) = self.locations.get(&self.default_location) {
                return root.clone();
            }
        }
        if name != APPDATA_LOCATION {
            warn!("Default install location not configured, using appdata");
        }
        ConfigManager::data_dir()
    }

    /// Directory holding downloaded archives
    pub fn downloads_root(&self) -> PathBuf {
        match self.downloads_dir {
            Some(ref dir) => dir.clone(),
            None => self.location_root(&self.default_location).join("downloads"),
        }
    }

    /// Whether `name` is a configured install location
    pub fn has_location(&self, name: &str) -> bool {
        self.locations.contains_key(name) || name == APPDATA_LOCATION
    }
}

/// Parent directory of install folders for a location and scheme
pub fn install_root(location: &str, scheme: PathScheme, prefs: &Preferences) -> PathBuf {
    let root = prefs.location_root(location);
    match scheme {
        PathScheme::Legacy => root,
        PathScheme::ModernShared => root.join("apps"),
    }
}

/// Full install directory of a cave
pub fn app_path(cave: &Cave, prefs: &Preferences) -> PathBuf {
    install_root(&cave.install_location, cave.path_scheme, prefs).join(&cave.install_folder)
}

/// Archive path for an upload: `<downloads>/<upload id><ext>`
pub fn download_path(upload: &Upload, prefs: &Preferences) -> PathBuf {
    prefs
        .downloads_root()
        .join(format!("{}{}", upload.id, archive_extension(&upload.filename)))
}

/// Extension of an upload file name, keeping compound tar extensions
pub fn archive_extension(filename: &str) -> String {
    let lower = filename.to_ascii_lowercase();
    for compound in [".tar.gz", ".tar.bz2", ".tar.xz", ".tar.zst"] {
        if lower.ends_with(compound) {
            return compound.to_string();
        }
    }
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Per-cave log file
pub fn cave_log_path(logs_dir: &Path, cave_id: Uuid) -> PathBuf {
    logs_dir.join("caves").join(format!("{}.log", cave_id))
}
