/// Errors from record store operations.
///
/// None of these are reachable on valid input; they signal a broken backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
