use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid transaction id: {0}")]
    InvalidId(String),

    #[error("unknown transaction type: {0}")]
    UnknownType(String),

    #[error("page size must be greater than zero")]
    ZeroPageSize,
}
