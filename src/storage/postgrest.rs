//! PostgREST rendering of list queries, and an HTTP store for hosted
//! PostgREST databases.
//!
//! The rendering half is always available; `PostgrestStore` is gated behind
//! the `postgrest` feature flag:
//! ```toml
//! [dependencies]
//! fleetdesk = { version = "0.1", features = ["postgrest"] }
//! ```
//!
//! A composed query renders as:
//! ```text
//! GET /rest/v1/vehicles?select=*&status=eq.active
//!     &or=(plate.ilike.%ABC%,model.ilike.%ABC%)&order=created_at.desc
//!     &offset=0&limit=10
//! Prefer: count=exact
//! ```

use crate::core::spec::{CountMode, QuerySpec};

/// `Prefer` header value for a count mode
pub fn prefer_header(count: CountMode) -> &'static str {
    match count {
        CountMode::Exact => "count=exact",
    }
}

/// Render a query as PostgREST query string pairs (not yet URL-encoded)
pub fn render_query(spec: &QuerySpec) -> Vec<(String, String)> {
    let mut pairs = vec![("select".to_string(), spec.projection.clone())];

    for eq in &spec.equalities {
        pairs.push((eq.column.clone(), format!("eq.{}", eq.value)));
    }

    if let Some(group) = &spec.search {
        let alternatives: Vec<String> = group
            .matches
            .iter()
            .map(|m| format!("{}.ilike.{}", m.column, quote_operand(&m.pattern)))
            .collect();
        pairs.push(("or".to_string(), format!("({})", alternatives.join(","))));
    }

    if let Some(order) = &spec.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }

    if let Some(range) = spec.range {
        pairs.push(("offset".to_string(), range.from.to_string()));
        pairs.push(("limit".to_string(), range.capacity().to_string()));
    }

    pairs
}

/// Double-quote an operand inside a logical group when it holds reserved
/// characters
fn quote_operand(value: &str) -> String {
    let reserved = |c: char| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\');
    if !value.contains(reserved) && value.trim() == value {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Total from a `Content-Range` header such as `0-9/42` or `*/0`
pub fn content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

#[cfg(feature = "postgrest")]
pub use client::PostgrestStore;

#[cfg(feature = "postgrest")]
mod client {
    use super::{content_range_total, prefer_header, render_query};
    use crate::core::error::StorageError;
    use crate::core::spec::QuerySpec;
    use crate::core::store::{RecordStore, StoreResponse};
    use async_trait::async_trait;
    use serde_json::Value;

    const BACKEND: &str = "PostgREST";

    /// Record store backed by a hosted PostgREST endpoint
    ///
    /// Requests carry the project API key and, when set, the caller's access
    /// token so the database's row-level security applies.
    #[derive(Clone, Debug)]
    pub struct PostgrestStore {
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        access_token: Option<String>,
    }

    impl PostgrestStore {
        /// Create a store for `base_url` (the project URL, without `/rest/v1`)
        pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
            Self {
                client: reqwest::Client::new(),
                base_url: base_url.into(),
                api_key: api_key.into(),
                access_token: None,
            }
        }

        pub fn with_client(mut self, client: reqwest::Client) -> Self {
            self.client = client;
            self
        }

        pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
            self.access_token = Some(token.into());
            self
        }

        fn collection_url(&self, collection: &str) -> String {
            format!(
                "{}/rest/v1/{}",
                self.base_url.trim_end_matches('/'),
                collection
            )
        }
    }

    #[async_trait]
    impl RecordStore for PostgrestStore {
        async fn execute(&self, spec: &QuerySpec) -> Result<StoreResponse, StorageError> {
            let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);

            let response = self
                .client
                .get(self.collection_url(&spec.collection))
                .query(&render_query(spec))
                .header("apikey", &self.api_key)
                .header("Prefer", prefer_header(spec.count))
                .bearer_auth(bearer)
                .send()
                .await
                .map_err(|e| StorageError::ConnectionError {
                    backend: BACKEND.to_string(),
                    message: e.to_string(),
                })?;

            let status = response.status();
            let count = response
                .headers()
                .get(reqwest::header::CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(content_range_total);

            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .map_err(|e| StorageError::DecodeError {
                        backend: BACKEND.to_string(),
                        message: format!("{} with unreadable body: {}", status, e),
                    })?;
                return Err(StorageError::QueryError {
                    backend: BACKEND.to_string(),
                    message: format!("{}: {}", status, body),
                });
            }

            let rows: Vec<Value> =
                response
                    .json()
                    .await
                    .map_err(|e| StorageError::DecodeError {
                        backend: BACKEND.to_string(),
                        message: e.to_string(),
                    })?;

            Ok(StoreResponse { rows, count })
        }
    }
}
