use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all transaction endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health_handler))
        .route(
            "/api/transactions",
            get(handler::list_handler).post(handler::create_handler),
        )
        .route("/api/transactions/paged", get(handler::paged_handler))
        .route("/api/transactions/type/:kind", get(handler::by_type_handler))
        .route(
            "/api/transactions/category/:category",
            get(handler::by_category_handler),
        )
        .route(
            "/api/transactions/:id",
            get(handler::get_handler)
                .put(handler::update_handler)
                .delete(handler::delete_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
