use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/scrape", get(handlers::scrape))
        .route(
            "/recommendations/user_based/:user_id",
            get(handlers::user_based_recommendations),
        )
        .route(
            "/recommendations/item_based/:user_id",
            get(handlers::item_based_recommendations),
        )
        .route("/interactions", post(handlers::create_interaction))
        .route("/chat", post(handlers::chat))
}
