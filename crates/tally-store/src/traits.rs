use tally_types::{Transaction, TransactionFields, TransactionId};

use crate::error::StoreResult;

/// Keyed container for transaction records.
///
/// All implementations must satisfy these invariants:
/// - `insert` assigns a fresh id (never one that is live) and the current
///   timestamp. Neither changes afterwards.
/// - Each write is atomic: concurrent readers see either the old record or
///   the new one, never a mix.
/// - Writes to different ids do not interfere.
/// - Returned records are copies; mutating them does not touch the store.
pub trait RecordStore: Send + Sync {
    /// Store a new record, completing its identity. Returns the stored copy.
    fn insert(&self, fields: TransactionFields) -> StoreResult<Transaction>;

    /// Write a record at its id, inserting it if no record is live there.
    ///
    /// An existing record keeps its position in creation order.
    fn save(&self, record: Transaction) -> StoreResult<Transaction>;

    /// Overwrite the record at `record.id` only if one is live.
    ///
    /// Returns `Ok(None)` without writing if the id is absent, so an update
    /// racing a delete cannot resurrect the deleted record.
    fn replace(&self, record: Transaction) -> StoreResult<Option<Transaction>>;

    /// Look up a record by id.
    ///
    /// Returns `Ok(None)` if the record does not exist.
    fn find_by_id(&self, id: &TransactionId) -> StoreResult<Option<Transaction>>;

    /// Copy of every live record, in creation order.
    fn find_all(&self) -> StoreResult<Vec<Transaction>>;

    /// Remove a record. Returns `true` if it existed; absence is not an error.
    fn delete_by_id(&self, id: &TransactionId) -> StoreResult<bool>;

    /// Check whether a record is live.
    fn exists_by_id(&self, id: &TransactionId) -> StoreResult<bool>;

    /// Number of live records.
    ///
    /// Default implementation counts a full snapshot. Backends may override.
    fn count(&self) -> StoreResult<usize> {
        Ok(self.find_all()?.len())
    }
}
