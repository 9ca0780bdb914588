//! Error types for Cavern
//!
//! All modules use `CavernResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Cavern operations
pub type CavernResult<T> = Result<T, CavernError>;

/// All errors that can occur in Cavern
#[derive(Error, Debug)]
pub enum CavernError {
    // Request errors
    #[error("Cave not found: {0}")]
    CaveNotFound(Uuid),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Task cancelled")]
    Cancelled,

    // Install errors
    #[error("Install failed for {game}: {reason}")]
    InstallFailed { game: String, reason: String },

    #[error("Unknown install location: {0}")]
    UnknownLocation(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Store errors
    #[error("Failed to persist {table} record {id}: {reason}")]
    StorePersist {
        table: &'static str,
        id: String,
        reason: String,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CavernError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an install failure for a game title
    pub fn install_failed(game: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstallFailed {
            game: game.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a cooperative cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CaveNotFound(_) => Some("Run: cavern list --all"),
            Self::InvalidRequest(_) => Some("Reinstall needs an existing cave; use: cavern install"),
            Self::UnknownLocation(_) => Some("Add it under [install.locations] in the config file"),
            Self::ConfigInvalid { .. } => Some("Run: cavern config init --force"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let id = Uuid::new_v4();
        let err = CavernError::CaveNotFound(id);
        assert!(err.to_string().contains("Cave not found"));
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn error_hint() {
        let err = CavernError::InvalidRequest("reinstall".to_string());
        assert!(err.hint().is_some());
        assert_eq!(CavernError::Cancelled.hint(), None);
    }

    #[test]
    fn error_cancelled() {
        assert!(CavernError::Cancelled.is_cancelled());
        assert!(!CavernError::Internal("boom".to_string()).is_cancelled());
    }

    #[test]
    fn install_failed_mentions_game() {
        let err = CavernError::install_failed("Bar Game", "disk full");
        assert_eq!(err.to_string(), "Install failed for Bar Game: disk full");
    }
}
