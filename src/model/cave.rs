//! Cave records: one locally installed copy of a game

use crate::model::game::{Game, Upload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directory layout used under an install location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathScheme {
    /// `<location>/<install folder>`
    Legacy,
    /// `<location>/apps/<install folder>`
    ModernShared,
}

/// Cave record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cave {
    /// Unique cave ID
    pub id: Uuid,

    pub game_id: u64,

    /// Game snapshot at install time
    pub game: Game,

    /// Upload snapshot (latest installed)
    pub upload: Option<Upload>,

    /// Install location name
    pub install_location: String,

    /// Folder name under the install location
    pub install_folder: String,

    pub path_scheme: PathScheme,

    /// Whether the user picked the upload explicitly
    #[serde(default)]
    pub hand_picked: bool,

    pub upload_id: Option<u64>,
    pub channel_name: Option<String>,
    pub build_id: Option<u64>,
    pub build_user_version: Option<String>,

    /// Set once an install completed
    pub installed_at: Option<DateTime<Utc>>,
}

impl Cave {
    /// Create a cave for a fresh install; nothing is installed yet
    pub fn new(
        game: Game,
        upload: Upload,
        install_location: String,
        install_folder: String,
        hand_picked: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id: game.id,
            game,
            upload: Some(upload),
            install_location,
            install_folder,
            path_scheme: PathScheme::ModernShared,
            hand_picked,
            upload_id: None,
            channel_name: None,
            build_id: None,
            build_user_version: None,
            installed_at: None,
        }
    }

    /// Whether an install ever completed for this cave
    pub fn is_installed(&self) -> bool {
        self.installed_at.is_some()
    }
}

/// Typed partial update for a cave
///
/// `Some` fields overwrite the stored value, `None` fields leave it untouched.
/// Version fields are nullable on the cave, so `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CavePatch {
    pub installed_at: Option<DateTime<Utc>>,
    pub upload: Option<Upload>,
    pub upload_id: Option<u64>,
    pub channel_name: Option<Option<String>>,
    pub build_id: Option<Option<u64>>,
    pub build_user_version: Option<Option<String>>,
}

impl CavePatch {
    /// Patch recording a completed install of `upload`
    ///
    /// Every version field is written, so nothing from a previous upload
    /// survives on the cave.
    pub fn installed(upload: &Upload, at: DateTime<Utc>) -> Self {
        Self {
            installed_at: Some(at),
            upload: Some(upload.clone()),
            upload_id: Some(upload.id),
            channel_name: Some(upload.channel_name.clone()),
            build_id: Some(upload.build_id),
            build_user_version: Some(upload.user_version().map(str::to_string)),
        }
    }

    /// Merge this patch into a cave
    pub fn apply(&self, cave: &mut Cave) {
        if let Some(at) = self.installed_at {
            cave.installed_at = Some(at);
        }
        if let Some(ref upload) = self.upload {
            cave.upload = Some(upload.clone());
        }
        if let Some(id) = self.upload_id {
            cave.upload_id = Some(id);
        }
        if let Some(ref name) = self.channel_name {
            cave.channel_name = name.clone();
        }
        if let Some(id) = self.build_id {
            cave.build_id = id;
        }
        if let Some(ref version) = self.build_user_version {
            cave.build_user_version = version.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
