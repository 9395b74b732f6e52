use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use tally_types::{Transaction, TransactionFields, TransactionId};

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// In-memory transaction store.
///
/// Records live in a creation-ordered map behind a single `RwLock`, with a
/// hash index from id to creation sequence. Every write takes the write lock
/// once, so each operation is atomic with respect to readers. Records are
/// cloned on read and write. Data is lost when the store is dropped.
pub struct InMemoryRecordStore {
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    records: BTreeMap<u64, Transaction>,
    index: HashMap<TransactionId, u64>,
    next_seq: u64,
}

impl StoreState {
    fn push(&mut self, record: Transaction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(record.id, seq);
        self.records.insert(seq, record);
    }

    fn fresh_id(&self) -> TransactionId {
        loop {
            let id = TransactionId::new();
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreState::default()),
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_state()?.records.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_state()?.records.is_empty())
    }

    /// Remove every record. Sequence numbers keep counting up.
    pub fn clear(&self) -> StoreResult<()> {
        let mut state = self.write_state()?;
        state.records.clear();
        state.index.clear();
        Ok(())
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn insert(&self, fields: TransactionFields) -> StoreResult<Transaction> {
        let mut state = self.write_state()?;
        // Id and timestamp are taken under the write lock so creation order
        // and timestamp order agree.
        let record = Transaction::new(state.fresh_id(), Utc::now(), fields);
        debug!(id = %record.id, "inserting transaction");
        state.push(record.clone());
        info!(id = %record.id, "transaction saved");
        Ok(record)
    }

    fn save(&self, record: Transaction) -> StoreResult<Transaction> {
        debug!(id = %record.id, "saving transaction");
        let mut state = self.write_state()?;
        match state.index.get(&record.id).copied() {
            Some(seq) => {
                state.records.insert(seq, record.clone());
            }
            None => state.push(record.clone()),
        }
        info!(id = %record.id, "transaction saved");
        Ok(record)
    }

    fn replace(&self, record: Transaction) -> StoreResult<Option<Transaction>> {
        let mut state = self.write_state()?;
        let Some(seq) = state.index.get(&record.id).copied() else {
            debug!(id = %record.id, "replace skipped, transaction not live");
            return Ok(None);
        };
        state.records.insert(seq, record.clone());
        info!(id = %record.id, "transaction replaced");
        Ok(Some(record))
    }

    fn find_by_id(&self, id: &TransactionId) -> StoreResult<Option<Transaction>> {
        let state = self.read_state()?;
        let found = state
            .index
            .get(id)
            .and_then(|seq| state.records.get(seq))
            .cloned();
        debug!(id = %id, found = found.is_some(), "looked up transaction");
        Ok(found)
    }

    fn find_all(&self) -> StoreResult<Vec<Transaction>> {
        let state = self.read_state()?;
        let all: Vec<Transaction> = state.records.values().cloned().collect();
        debug!(count = all.len(), "snapshot of all transactions");
        Ok(all)
    }

    fn delete_by_id(&self, id: &TransactionId) -> StoreResult<bool> {
        let mut state = self.write_state()?;
        match state.index.remove(id) {
            Some(seq) => {
                state.records.remove(&seq);
                info!(id = %id, "transaction deleted");
                Ok(true)
            }
            None => {
                warn!(id = %id, "attempted to delete non-existent transaction");
                Ok(false)
            }
        }
    }

    fn exists_by_id(&self, id: &TransactionId) -> StoreResult<bool> {
        Ok(self.read_state()?.index.contains_key(id))
    }

    fn count(&self) -> StoreResult<usize> {
        self.len()
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or(0);
        f.debug_struct("InMemoryRecordStore")
            .field("record_count", &count)
            .finish()
    }
}
