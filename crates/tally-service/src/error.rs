use tally_store::StoreError;
use tally_types::TransactionId;

/// A candidate record was rejected before anything was written.
///
/// Each rule has its own variant so callers can tell them apart; the display
/// text is the human-readable reason returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Transaction type must be either CREDIT or DEBIT")]
    InvalidType,

    #[error("Description cannot be empty")]
    EmptyDescription,
}

/// Errors produced by service operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Transaction not found with id: {0}")]
    NotFound(TransactionId),

    /// Unexpected failure. The detail is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Fieldless classification of a [`ServiceError`], consumed by transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Internal,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        Self::Internal(e.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
