//! Service layer for Tally.
//!
//! Composes the record store with a validation gate, a coarse read cache,
//! and a filtering/pagination engine into the operations the transport layer
//! calls: create, update, delete, and the read family.
//!
//! Control flow for every request: validate ([`Validator`]) → read or mutate
//! the [`RecordStore`](tally_store::RecordStore) → invalidate or populate the
//! [`TransactionCache`] → narrow through [`query`] before returning.

pub mod cache;
pub mod config;
pub mod error;
pub mod query;
pub mod service;
pub mod validation;

pub use cache::{CacheMetrics, ListKey, TransactionCache};
pub use config::{PagingConfig, ServiceConfig};
pub use error::{ErrorKind, ServiceError, ServiceResult, ValidationError};
pub use service::TransactionService;
pub use validation::{AmountRule, DescriptionRule, TypeRule, ValidationRule, Validator};
