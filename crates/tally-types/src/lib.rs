//! Foundation types for Tally.
//!
//! This crate provides the record, identifier, and paging types shared by the
//! store, the service layer, and the HTTP boundary. Every other Tally crate
//! depends on `tally-types`.
//!
//! # Key Types
//!
//! - [`Transaction`]: A stored ledger entry (the only entity)
//! - [`TransactionId`]: UUID v7 record identifier
//! - [`TransactionType`]: `CREDIT` or `DEBIT`
//! - [`TransactionDraft`]: Candidate fields submitted for create/update
//! - [`PageRequest`] / [`Page`]: Pagination input and output

pub mod error;
pub mod id;
pub mod page;
pub mod transaction;

pub use error::TypeError;
pub use id::TransactionId;
pub use page::{Page, PageRequest};
pub use transaction::{Transaction, TransactionDraft, TransactionFields, TransactionType};
