use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde_json::json;
use tally_service::{ErrorKind, ServiceError};
use thiserror::Error;

/// Message returned for every unexpected failure. Internal detail is logged,
/// never echoed.
pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred while processing your request";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Transport status for a service error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// An error response: `{"timestamp": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR_MESSAGE.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err.kind() {
            ErrorKind::Internal => {
                tracing::error!(error = %err, "request failed");
                Self::internal()
            }
            kind => Self {
                status: status_for(kind),
                message: err.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use tally_service::ValidationError;
    use tally_types::TransactionId;

    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_message_passes_through() {
        let api: ApiError = ServiceError::from(ValidationError::NonPositiveAmount).into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "Amount must be greater than zero");
    }

    #[test]
    fn not_found_message_names_the_id() {
        let id = TransactionId::new();
        let api: ApiError = ServiceError::NotFound(id).into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.message, format!("Transaction not found with id: {id}"));
    }

    #[test]
    fn internal_detail_is_hidden() {
        let api: ApiError = ServiceError::Internal("store lock poisoned".into()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, INTERNAL_ERROR_MESSAGE);
    }
}
