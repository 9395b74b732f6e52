//! Read-through cache over store queries.
//!
//! Two kinds of entries are kept: single records keyed by id, and result
//! lists keyed by query shape ([`ListKey`]). Any mutation drops every list
//! entry, because one write can move a record between buckets. Updates and
//! deletes also drop the affected record entry.
//!
//! Category keys come straight from callers, so the number of list entries
//! is capped. Once the cap is reached, results for new keys are returned
//! without being stored until the next invalidation empties the map.
//!
//! Loads race with invalidations: a reader may compute a list from a snapshot
//! taken just before a write lands. Every invalidation bumps a generation
//! counter, and a loaded value is only stored if the generation it was read
//! under is still current, so a stale load is returned to its caller but
//! never cached.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tally_types::{Transaction, TransactionId, TransactionType};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

/// Default cap on cached list entries.
pub const DEFAULT_LIST_CAPACITY: usize = 256;

/// Key for a cached result list.
///
/// Type keys hold the parsed type and category keys are lower-cased, so
/// queries that differ only in case share an entry. Type and category keys
/// never collide with each other.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListKey {
    All,
    ByType(TransactionType),
    ByCategory(String),
}

impl ListKey {
    pub fn by_category(raw: &str) -> Self {
        Self::ByCategory(raw.to_lowercase())
    }
}

/// Point-in-time copy of the cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub invalidations: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64) / (total as f64) * 100.0
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    invalidations: AtomicU64,
}

#[derive(Default)]
struct CacheState {
    generation: u64,
    records: HashMap<TransactionId, Transaction>,
    lists: HashMap<ListKey, Vec<Transaction>>,
}

/// Coarse-grained read cache for the transaction service.
pub struct TransactionCache {
    state: RwLock<CacheState>,
    counters: Counters,
    list_capacity: usize,
}

impl TransactionCache {
    pub fn new() -> Self {
        Self::with_list_capacity(DEFAULT_LIST_CAPACITY)
    }

    /// Cache that stores at most `list_capacity` list entries.
    pub fn with_list_capacity(list_capacity: usize) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            counters: Counters::default(),
            list_capacity,
        }
    }

    /// Cached record for `id`, or the result of `load` (stored on success).
    ///
    /// A `None` from `load` is not cached.
    pub fn record_or_load<F>(
        &self,
        id: &TransactionId,
        load: F,
    ) -> ServiceResult<Option<Transaction>>
    where
        F: FnOnce() -> ServiceResult<Option<Transaction>>,
    {
        let generation = {
            let state = self.read_state()?;
            if let Some(hit) = state.records.get(id) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(id = %id, "record cache hit");
                return Ok(Some(hit.clone()));
            }
            state.generation
        };
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        let loaded = load()?;
        if let Some(record) = &loaded {
            let mut state = self.write_state()?;
            if state.generation == generation {
                state.records.insert(*id, record.clone());
                self.counters.sets.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(loaded)
    }

    /// Cached list for `key`, or the result of `load` (stored on success).
    pub fn list_or_load<F>(&self, key: ListKey, load: F) -> ServiceResult<Vec<Transaction>>
    where
        F: FnOnce() -> ServiceResult<Vec<Transaction>>,
    {
        let generation = {
            let state = self.read_state()?;
            if let Some(hit) = state.lists.get(&key) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(?key, "list cache hit");
                return Ok(hit.clone());
            }
            state.generation
        };
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        let loaded = load()?;
        let mut state = self.write_state()?;
        if state.generation != generation {
            return Ok(loaded);
        }
        if state.lists.len() >= self.list_capacity && !state.lists.contains_key(&key) {
            debug!(?key, capacity = self.list_capacity, "list cache full, not storing");
            return Ok(loaded);
        }
        state.lists.insert(key, loaded.clone());
        self.counters.sets.fetch_add(1, Ordering::Relaxed);
        Ok(loaded)
    }

    /// Drop every list entry (full list, by-type, by-category).
    pub fn invalidate_lists(&self) -> ServiceResult<()> {
        let mut state = self.write_state()?;
        state.generation += 1;
        state.lists.clear();
        self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
        debug!("list cache invalidated");
        Ok(())
    }

    /// Drop every list entry and the record entry for `id`.
    pub fn invalidate_record(&self, id: &TransactionId) -> ServiceResult<()> {
        let mut state = self.write_state()?;
        state.generation += 1;
        state.lists.clear();
        state.records.remove(id);
        self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
        debug!(id = %id, "record and list cache invalidated");
        Ok(())
    }

    /// Drop everything.
    pub fn clear(&self) -> ServiceResult<()> {
        let mut state = self.write_state()?;
        state.generation += 1;
        state.lists.clear();
        state.records.clear();
        Ok(())
    }

    pub fn contains_list(&self, key: &ListKey) -> bool {
        self.read_state()
            .map(|s| s.lists.contains_key(key))
            .unwrap_or(false)
    }

    pub fn contains_record(&self, id: &TransactionId) -> bool {
        self.read_state()
            .map(|s| s.records.contains_key(id))
            .unwrap_or(false)
    }

    /// Number of cached list entries.
    pub fn list_entries(&self) -> usize {
        self.read_state().map(|s| s.lists.len()).unwrap_or(0)
    }

    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            sets: self.counters.sets.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
        }
    }

    fn read_state(&self) -> ServiceResult<RwLockReadGuard<'_, CacheState>> {
        self.state
            .read()
            .map_err(|_| ServiceError::Internal("cache lock poisoned".into()))
    }

    fn write_state(&self) -> ServiceResult<RwLockWriteGuard<'_, CacheState>> {
        self.state
            .write()
            .map_err(|_| ServiceError::Internal("cache lock poisoned".into()))
    }
}

impl Default for TransactionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransactionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionCache")
            .field("list_entries", &self.list_entries())
            .field("list_capacity", &self.list_capacity)
            .field("metrics", &self.metrics())
            .finish()
    }
}
