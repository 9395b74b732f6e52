//! HTTP server for the Tally transaction ledger.
//!
//! Exposes the transaction service as a JSON REST API under
//! `/api/transactions`. Service errors map to status codes through
//! [`error::status_for`]; every error body has the shape
//! `{"timestamp": ..., "message": ...}`.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::AppState;
pub use server::TallyServer;
