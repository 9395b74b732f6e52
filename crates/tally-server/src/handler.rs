use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::json;
use tally_service::{PagingConfig, TransactionService};
use tally_types::{Page, Transaction, TransactionDraft, TransactionId};

use crate::error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: Arc<TransactionService>,
    pub paging: PagingConfig,
}

impl AppState {
    pub fn new(service: Arc<TransactionService>, paging: PagingConfig) -> Self {
        Self { service, paging }
    }
}

/// Raw `?page=&size=` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(raw: &str) -> ApiResult<TransactionId> {
    raw.parse::<TransactionId>()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}

fn parse_body(body: Result<Json<TransactionDraft>, JsonRejection>) -> ApiResult<TransactionDraft> {
    body.map(|Json(draft)| draft)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_handler(
    State(state): State<AppState>,
    body: Result<Json<TransactionDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let draft = parse_body(body)?;
    let created = state.service.create(&draft)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<TransactionDraft>, JsonRejection>,
) -> ApiResult<Json<Transaction>> {
    let id = parse_id(&raw_id)?;
    let draft = parse_body(body)?;
    Ok(Json(state.service.update(&id, &draft)?))
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&raw_id)?;
    state.service.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Transaction>> {
    let id = parse_id(&raw_id)?;
    Ok(Json(state.service.get_by_id(&id)?))
}

pub async fn list_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.service.get_all()?))
}

pub async fn paged_handler(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<Page<Transaction>>> {
    let Query(params) = params.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let request = state.paging.resolve(params.page, params.size);
    Ok(Json(state.service.get_paged(request)?))
}

pub async fn by_type_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.service.get_by_type(&kind)?))
}

pub async fn by_category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.service.get_by_category(&category)?))
}
