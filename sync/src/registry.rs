//! Shared registry of records moved during the current run

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::error;

use crate::error::{Result, SyncError};
use crate::ledger::{append_history, Ledger};
use crate::record::Record;

/// Process-wide store of records copied this run, keyed by root flattened
/// key and pending flush into the per-root history ledger.
///
/// Every read-modify-write happens under one internal lock; call sites never
/// lock anything themselves. Cloning shares the same underlying store.
#[derive(Debug, Clone)]
pub struct MovedRegistry {
    entries: Arc<Mutex<HashMap<String, Vec<Record>>>>,
    ledger: Ledger,
}

impl MovedRegistry {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ledger,
        }
    }

    /// Register an empty entry for a root whose worker is starting
    pub fn create_entry(&self, key: &str) {
        self.lock().insert(key.to_string(), Vec::new());
    }

    /// Append a successfully moved record to its root's entry
    pub fn append(&self, key: &str, record: Record) {
        self.lock().entry(key.to_string()).or_default().push(record);
    }

    /// Drop one occurrence of a record whose copy failed after an optimistic
    /// append elsewhere; a no-op when the record is not present
    pub fn remove(&self, key: &str, record: &Record) {
        let mut entries = self.lock();
        if let Some(pending) = entries.get_mut(key) {
            if let Some(pos) = pending.iter().position(|r| r == record) {
                pending.remove(pos);
            }
        }
    }

    /// Number of records pending flush for a root, zero when absent
    pub fn pending(&self, key: &str) -> usize {
        self.lock().get(key).map(Vec::len).unwrap_or(0)
    }

    /// Append a root's pending records to its history ledger and delete the
    /// entry. The lock is held across the write so a concurrent shutdown
    /// flush cannot observe a half-flushed entry.
    pub fn flush_and_remove(&self, key: &str) -> Result<()> {
        let mut entries = self.lock();
        let Some(records) = entries.get(key) else {
            return Ok(());
        };
        append_history(&self.ledger.history_path(key), records).map_err(|e| {
            SyncError::history_error(key, format!("Failed to flush moved records: {e}"))
        })?;
        entries.remove(key);
        Ok(())
    }

    /// Flush every remaining entry, best effort; used at shutdown so
    /// accumulated in-memory history is not lost on abnormal termination
    pub fn flush_and_remove_all(&self) {
        let mut entries = self.lock();
        for (key, records) in entries.drain() {
            if let Err(e) = append_history(&self.ledger.history_path(&key), &records) {
                error!("Failed to flush moved records for '{}': {}", key, e);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Record>>> {
        // A worker that panicked mid-update must not block the shutdown flush
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
