//! JSON file store: `<root>/<table>/<id>.json`

use crate::error::{CavernError, CavernResult};
use crate::model::{Cave, Game};
use crate::store::{sort_caves, RecordStore, CAVES, GAMES};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Record store backed by one JSON file per record
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Create a store rooted at `root`; directories are created lazily
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, table: &str, id: &str) -> PathBuf {
        self.root.join(table).join(format!("{}.json", id))
    }

    async fn load<T: DeserializeOwned>(&self, table: &str, id: &str) -> CavernResult<Option<T>> {
        let path = self.record_path(table, id);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| CavernError::io(format!("reading record {}", path.display()), e))?;

        let record = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    async fn save<T: Serialize>(&self, table: &'static str, id: &str, record: &T) -> CavernResult<()> {
        let path = self.record_path(table, id);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CavernError::io(format!("creating {} directory", table), e))?;
        }

        let content = serde_json::to_string_pretty(record)?;

        // Write to a sibling file first so a crash never leaves half a record
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .await
            .map_err(|e| CavernError::StorePersist {
                table,
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| CavernError::StorePersist {
                table,
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Saved {} record {}", table, id);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonStore {
    async fn find_cave(&self, id: Uuid) -> CavernResult<Option<Cave>> {
        self.load(CAVES, &id.to_string()).await
    }

    async fn insert_cave(&self, cave: &Cave) -> CavernResult<()> {
        self.save(CAVES, &cave.id.to_string(), cave).await
    }

    async fn delete_cave(&self, id: Uuid) -> CavernResult<()> {
        let path = self.record_path(CAVES, &id.to_string());
        if path.exists() {
            fs::remove_file(&path)
                .await
                .map_err(|e| CavernError::io(format!("deleting record {}", path.display()), e))?;
            debug!("Deleted cave record {}", id);
        }
        Ok(())
    }

    async fn list_caves(&self) -> CavernResult<Vec<Cave>> {
        let dir = self.root.join(CAVES);

        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut caves = vec![];
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| CavernError::io("reading caves directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CavernError::io("reading cave entry", e))?
        {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path).await else {
                continue;
            };
            match serde_json::from_str::<Cave>(&content) {
                Ok(cave) => caves.push(cave),
                Err(e) => warn!("Skipping unreadable cave record {}: {}", path.display(), e),
            }
        }

        sort_caves(&mut caves);
        Ok(caves)
    }

    async fn save_game(&self, game: &Game) -> CavernResult<()> {
        self.save(GAMES, &game.id.to_string(), game).await
    }

    async fn find_game(&self, id: u64) -> CavernResult<Option<Game>> {
        self.load(GAMES, &id.to_string()).await
    }
}
