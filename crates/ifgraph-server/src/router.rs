//! Axum router setup

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    ServerState,
    handlers::{health_check, upload},
};

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/api/upload", post(upload))
        .route("/api/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
