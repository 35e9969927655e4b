//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(handlers::search))
        .route("/stats", get(handlers::stats))
        .route("/tables/:name", get(handlers::table))
        .route("/directory/:kind", get(handlers::directory))
        .route("/connection", get(handlers::connection))
        .route("/cache/clear", post(handlers::clear_cache))
        // Operational routes
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Add state
        .with_state(state)
}
