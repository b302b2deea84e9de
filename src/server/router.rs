//! Router builder utilities for list routes

use crate::server::handlers::{AppState, list_names, list_records};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

/// Build list routes
///
/// - GET /lists - Registered list names
/// - GET /lists/{name} - One page of a list
pub fn build_list_routes(state: AppState) -> Router {
    Router::new()
        .route("/lists", get(list_names))
        .route("/lists/{name}", get(list_records))
        .with_state(state)
}

/// Build health check routes
pub fn build_health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "fleetdesk"
    }))
}
