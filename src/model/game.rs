//! Game and upload metadata

use serde::{Deserialize, Serialize};

/// An installable title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Remote game ID
    pub id: u64,

    /// Display title
    pub title: String,

    /// Canonical page URL, e.g. `https://foo.itch.io/bar-game`
    #[serde(default)]
    pub url: Option<String>,

    /// Kind of title ("game", "tool", "assets", ...)
    #[serde(default = "default_classification")]
    pub classification: String,
}

fn default_classification() -> String {
    "game".to_string()
}

impl Game {
    /// Create a game with no URL
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            url: None,
            classification: default_classification(),
        }
    }

    /// Set the canonical URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A build attached to an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: u64,

    /// Version string chosen by the developer
    #[serde(default)]
    pub user_version: Option<String>,
}

/// One downloadable file of a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    /// Remote upload ID
    pub id: u64,

    /// Original file name, used for the archive extension
    pub filename: String,

    /// Size in bytes, if known
    #[serde(default)]
    pub size: Option<u64>,

    /// Release channel for wharf-enabled uploads
    #[serde(default)]
    pub channel_name: Option<String>,

    #[serde(default)]
    pub build_id: Option<u64>,

    #[serde(default)]
    pub build: Option<Build>,
}

impl Upload {
    /// Create an unversioned upload
    pub fn new(id: u64, filename: impl Into<String>) -> Self {
        Self {
            id,
            filename: filename.into(),
            size: None,
            channel_name: None,
            build_id: None,
            build: None,
        }
    }

    /// The developer-facing version string of this upload's build
    pub fn user_version(&self) -> Option<&str> {
        self.build.as_ref().and_then(|b| b.user_version.as_deref())
    }
}

/// Human-readable version label used in install logs
pub fn version_name(build_id: Option<u64>, user_version: Option<&str>) -> String {
    match (user_version, build_id) {
        (Some(v), Some(id)) => format!("{} (#{})", v, id),
        (Some(v), None) => v.to_string(),
        (None, Some(id)) => format!("#{}", id),
        (None, None) => "<not versioned>".to_string(),
    }
}
