use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;
use super::static_files::static_handler;

// UI Routes - landing page and embedded assets
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - the query pipeline
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fetch-schema", get(handlers::api::fetch_schema))
        .route("/generate-query", post(handlers::api::generate_query))
        .route("/health", get(handlers::api::health))
}
