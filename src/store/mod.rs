//! Persistent record store
//!
//! The install core only talks to the [`RecordStore`] trait. Two backends ship
//! with the crate: one JSON file per record on disk, and an in-memory map.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::error::{CavernError, CavernResult};
use crate::model::{Cave, CavePatch, Game};
use async_trait::async_trait;
use uuid::Uuid;

/// Table holding cave records
pub const CAVES: &str = "caves";

/// Table holding game snapshots
pub const GAMES: &str = "games";

/// Record store consumed by the install core
///
/// No transactions: every call is an independent read or write.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load a cave by ID
    async fn find_cave(&self, id: Uuid) -> CavernResult<Option<Cave>>;

    /// Write a full cave record, replacing any previous one
    async fn insert_cave(&self, cave: &Cave) -> CavernResult<()>;

    /// Delete a cave record; deleting a missing record is not an error
    async fn delete_cave(&self, id: Uuid) -> CavernResult<()>;

    /// List all caves, most recently installed first
    async fn list_caves(&self) -> CavernResult<Vec<Cave>>;

    /// Write a game snapshot
    async fn save_game(&self, game: &Game) -> CavernResult<()>;

    /// Load a game snapshot by ID
    async fn find_game(&self, id: u64) -> CavernResult<Option<Game>>;

    /// Read-modify-write a cave with a typed patch
    async fn update_cave(&self, id: Uuid, patch: &CavePatch) -> CavernResult<Cave> {
        let mut cave = self
            .find_cave(id)
            .await?
            .ok_or(CavernError::CaveNotFound(id))?;

        patch.apply(&mut cave);
        self.insert_cave(&cave).await?;
        Ok(cave)
    }
}

/// Ordering used by `list_caves`: installed caves newest first, then the rest
pub(crate) fn sort_caves(caves: &mut [Cave]) {
    caves.sort_by(|a, b| b.installed_at.cmp(&a.installed_at));
}
