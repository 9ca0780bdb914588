//! Per-cave mutual exclusion
//!
//! Two tasks addressing the same cave run one after the other instead of
//! racing on its record and install folder.

use crate::error::{CavernError, CavernResult};
use crate::task::TaskContext;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

type LockTable = HashMap<Uuid, Arc<AsyncMutex<()>>>;

#[derive(Debug, Clone, Default)]
pub struct CaveLocks {
    table: Arc<Mutex<LockTable>>,
}

impl CaveLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, LockTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for exclusive access to a cave
    ///
    /// Fails with `Cancelled` if the task is cancelled while waiting.
    pub async fn acquire(&self, cave_id: Uuid, ctx: &TaskContext) -> CavernResult<CaveGuard> {
        let lock = self.table().entry(cave_id).or_default().clone();

        let guard = match lock.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Cave {} is busy, waiting", cave_id);
                let token = ctx.cancellation_token();
                tokio::select! {
                    guard = lock.lock_owned() => guard,
                    _ = token.cancelled() => return Err(CavernError::Cancelled),
                }
            }
        };

        Ok(CaveGuard {
            locks: self.clone(),
            cave_id,
            _guard: guard,
        })
    }

    /// Whether some task currently holds the cave
    pub fn is_locked(&self, cave_id: Uuid) -> bool {
        self.table()
            .get(&cave_id)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table().len()
    }
}

/// Exclusive access to one cave, released on drop
pub struct CaveGuard {
    locks: CaveLocks,
    cave_id: Uuid,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for CaveGuard {
    fn drop(&mut self) {
        let mut table = self.locks.table();
        // Only the table and this guard still reference the lock: nobody waits
        if table
            .get(&self.cave_id)
            .is_some_and(|lock| Arc::strong_count(lock) <= 2)
        {
            table.remove(&self.cave_id);
        }
    }
}
