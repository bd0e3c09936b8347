//! Per-record serialization of mutating file operations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = HashMap<i64, Arc<AsyncMutex<()>>>;

/// Async mutex per file id.
///
/// Update and delete of the same record run one at a time; different ids do
/// not contend. An entry is removed once no task holds or waits on it.
#[derive(Debug, Clone, Default)]
pub struct RecordLocks {
    table: Arc<Mutex<LockTable>>,
}

impl RecordLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to record `id`.
    pub async fn lock(&self, id: i64) -> RecordGuard {
        let mutex = {
            let mut table = self.table();
            table.entry(id).or_default().clone()
        };

        // Created before waiting so a cancelled wait still prunes the entry.
        let mut record = RecordGuard {
            id,
            guard: None,
            table: Arc::clone(&self.table),
        };
        record.guard = Some(mutex.lock_owned().await);
        record
    }

    /// Number of ids currently held or waited on.
    pub fn active(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> MutexGuard<'_, LockTable> {
        lock_table(&self.table)
    }
}

fn lock_table(table: &Mutex<LockTable>) -> MutexGuard<'_, LockTable> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Exclusive access to one record id. Released on drop.
#[derive(Debug)]
pub struct RecordGuard {
    id: i64,
    guard: Option<OwnedMutexGuard<()>>,
    table: Arc<Mutex<LockTable>>,
}

impl Drop for RecordGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut table = lock_table(&self.table);
        let idle = table
            .get(&self.id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if idle {
            table.remove(&self.id);
        }
    }
}
