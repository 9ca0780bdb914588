//! In-memory record store

use crate::error::CavernResult;
use crate::model::{Cave, Game};
use crate::store::{sort_caves, RecordStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Record store kept in process memory, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    caves: Mutex<HashMap<Uuid, Cave>>,
    games: Mutex<HashMap<u64, Game>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_cave(&self, id: Uuid) -> CavernResult<Option<Cave>> {
        Ok(self.caves.lock().await.get(&id).cloned())
    }

    async fn insert_cave(&self, cave: &Cave) -> CavernResult<()> {
        self.caves.lock().await.insert(cave.id, cave.clone());
        Ok(())
    }

    async fn delete_cave(&self, id: Uuid) -> CavernResult<()> {
        self.caves.lock().await.remove(&id);
        Ok(())
    }

    async fn list_caves(&self) -> CavernResult<Vec<Cave>> {
        let mut caves: Vec<Cave> = self.caves.lock().await.values().cloned().collect();
        sort_caves(&mut caves);
        Ok(caves)
    }

    async fn save_game(&self, game: &Game) -> CavernResult<()> {
        self.games.lock().await.insert(game.id, game.clone());
        Ok(())
    }

    async fn find_game(&self, id: u64) -> CavernResult<Option<Game>> {
        Ok(self.games.lock().await.get(&id).cloned())
    }
}
