//! HTTP handlers for list routes

use crate::core::auth::HeaderSession;
use crate::core::error::{FetchError, RequestError};
use crate::core::query::{ListQueryParams, PaginatedResponse};
use crate::server::list_registry::ListRegistry;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use serde_json::{Value, json};
use std::sync::Arc;

/// Shared state for list handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ListRegistry>,

    /// Header carrying the gateway-authenticated caller id
    pub session_header: Arc<str>,
}

/// List registered list names
///
/// Route: `GET /lists`
pub async fn list_names(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "lists": state.registry.names() }))
}

/// Fetch one page of a list
///
/// Route: `GET /lists/{name}?page=&itemsPerPage=&search=&filter.<key>=`
pub async fn list_records(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<PaginatedResponse>, FetchError> {
    let list = state
        .registry
        .get(&name)
        .ok_or_else(|| RequestError::UnknownList { name: name.clone() })?;

    let request = ListQueryParams::from_pairs(pairs)?.into_request();
    let session = HeaderSession::from_headers(&headers, &state.session_header);

    let page = list.fetch(&session, &request).await?;

    Ok(Json(PaginatedResponse::new(page, &request)))
}
