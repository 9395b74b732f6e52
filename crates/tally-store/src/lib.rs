//! Record storage for Tally transactions.
//!
//! The store exclusively owns the canonical copy of every transaction. All
//! callers receive clones; mutation only happens through the store's own
//! atomic operations.
//!
//! # Storage Backends
//!
//! All backends implement the [`RecordStore`] trait:
//!
//! - [`InMemoryRecordStore`] -- `RwLock`-guarded map, volatile, process-lifetime
//!
//! # Design Rules
//!
//! 1. Identity (`id`, `timestamp`) is assigned by the store, exactly once.
//! 2. Every `insert`/`save`/`replace`/`delete` is a single critical section;
//!    readers never observe a partially written record.
//! 3. Reads return owned copies, never references into the store.
//! 4. A missing id is `None`/`false`, not an error. "Not found" is decided by
//!    the caller.
//! 5. `find_all` returns records in creation order.

pub mod error;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRecordStore;
pub use traits::RecordStore;
