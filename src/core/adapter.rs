//! List-fetching adapters
//!
//! A [`ListConfig`] describes one list page (collection, projection, default
//! order, search fields, filter mapping, optional ownership scoping, optional
//! row transform). Two fetchers run it:
//!
//! - [`ClientFetcher`]: no identity handling; the store's own access control
//!   decides what the caller may see.
//! - [`ServerFetcher`]: resolves the caller through a [`SessionProvider`] and
//!   restricts every query to the caller's rows when scoping is configured.
//!
//! Both compose the query with [`build_query`] and run it in one store call.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ListConfig::builder("vehicles")
//!     .order_by("created_at", false)
//!     .search_fields(["plate", "model", "brand"])
//!     .build()?;
//!
//! let fetcher = ClientFetcher::new(config, store);
//! let page = fetcher
//!     .fetch(&ListRequest::new(1, 10).with_search("ABC").with_ui_filter("status", "active"))
//!     .await?;
//! ```

use crate::core::auth::{CallerIdentity, SessionProvider};
use crate::core::error::{ConfigError, FetchError, FetchResult, RequestError};
use crate::core::query::{ListPage, ListRequest};
use crate::core::spec::{OrderBy, QuerySpec, SELECT_ALL, SearchGroup};
use crate::core::store::RecordStore;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Pure per-row reshaping applied to every fetched row
pub type RowTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Validated, immutable configuration of one list
#[derive(Clone)]
pub struct ListConfig {
    collection: String,
    projection: String,
    default_order: Option<OrderBy>,
    search_fields: Vec<String>,
    filter_map: IndexMap<String, String>,
    scope_by_user_field: Option<String>,
    transform: Option<RowTransform>,
}

impl fmt::Debug for ListConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListConfig")
            .field("collection", &self.collection)
            .field("projection", &self.projection)
            .field("default_order", &self.default_order)
            .field("search_fields", &self.search_fields)
            .field("filter_map", &self.filter_map)
            .field("scope_by_user_field", &self.scope_by_user_field)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl ListConfig {
    pub fn builder(collection: impl Into<String>) -> ListConfigBuilder {
        ListConfigBuilder::new(collection)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn default_order(&self) -> Option<&OrderBy> {
        self.default_order.as_ref()
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn filter_map(&self) -> &IndexMap<String, String> {
        &self.filter_map
    }

    /// Column holding the owner id, when rows are scoped to their owner
    pub fn scope_column(&self) -> Option<&str> {
        self.scope_by_user_field.as_deref()
    }

    /// Column targeted by a UI filter key (the key itself when unmapped)
    pub fn filter_column<'a>(&'a self, key: &'a str) -> &'a str {
        self.filter_map.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Apply the row transform to every row, keeping order and count
    pub fn transform_rows(&self, rows: Vec<Value>) -> Vec<Value> {
        match &self.transform {
            Some(transform) => rows.into_iter().map(|row| transform(row)).collect(),
            None => rows,
        }
    }
}

/// Builder for [`ListConfig`]
pub struct ListConfigBuilder {
    collection: String,
    projection: String,
    default_order: Option<OrderBy>,
    search_fields: Vec<String>,
    filter_map: IndexMap<String, String>,
    scope_by_user_field: Option<String>,
    transform: Option<RowTransform>,
}

impl ListConfigBuilder {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            projection: SELECT_ALL.to_string(),
            default_order: None,
            search_fields: Vec::new(),
            filter_map: IndexMap::new(),
            scope_by_user_field: None,
            transform: None,
        }
    }

    /// Projection forwarded verbatim to the store
    pub fn select(mut self, projection: impl Into<String>) -> Self {
        self.projection = projection.into();
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.default_order = Some(OrderBy {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Route the UI filter `key` to `column`
    pub fn map_filter(mut self, key: impl Into<String>, column: impl Into<String>) -> Self {
        self.filter_map.insert(key.into(), column.into());
        self
    }

    /// Restrict server-context fetches to rows whose `column` is the caller id
    pub fn scope_by_user_field(mut self, column: impl Into<String>) -> Self {
        self.scope_by_user_field = Some(column.into());
        self
    }

    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn build(self) -> Result<ListConfig, ConfigError> {
        if self.collection.trim().is_empty() {
            return Err(ConfigError::EmptyCollection);
        }

        let empty_column = |role: &str| ConfigError::EmptyColumn {
            collection: self.collection.clone(),
            role: role.to_string(),
        };

        if let Some(order) = &self.default_order {
            if order.column.is_empty() {
                return Err(empty_column("order"));
            }
        }
        if self.scope_by_user_field.as_deref() == Some("") {
            return Err(empty_column("scope"));
        }
        if self.filter_map.iter().any(|(k, c)| k.is_empty() || c.is_empty()) {
            return Err(empty_column("filter"));
        }

        let mut seen = HashSet::new();
        for field in &self.search_fields {
            if field.is_empty() {
                return Err(empty_column("search"));
            }
            if !seen.insert(field.as_str()) {
                return Err(ConfigError::DuplicateSearchField {
                    collection: self.collection.clone(),
                    field: field.clone(),
                });
            }
        }

        Ok(ListConfig {
            collection: self.collection,
            projection: self.projection,
            default_order: self.default_order,
            search_fields: self.search_fields,
            filter_map: self.filter_map,
            scope_by_user_field: self.scope_by_user_field,
            transform: self.transform,
        })
    }
}

/// Ownership restriction for one query
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// No ownership restriction
    Unscoped,

    /// Only rows whose `column` equals the caller id
    Owner {
        column: &'a str,
        caller: &'a CallerIdentity,
    },
}

/// Compose the query for `request` against `config`
///
/// Order: base select with exact count, ownership scope, filters, search
/// group, default order, row window.
pub fn build_query(
    config: &ListConfig,
    request: &ListRequest,
    scope: Scope<'_>,
) -> Result<QuerySpec, RequestError> {
    let range = request.range()?;

    let mut spec = QuerySpec::select(config.collection(), config.projection());

    if let Scope::Owner { column, caller } = scope {
        spec = spec.with_equality(column, caller.user_id.to_string());
    }

    for (key, selection) in &request.filters {
        if let Some(value) = selection.restriction() {
            spec = spec.with_equality(config.filter_column(key), value);
        }
    }

    if let Some(term) = request.search_term() {
        if !config.search_fields().is_empty() {
            spec = spec.with_search(SearchGroup::over(term, config.search_fields()));
        }
    }

    if let Some(order) = config.default_order() {
        spec = spec.with_order(order.clone());
    }

    Ok(spec.with_range(range))
}

async fn execute(
    config: &ListConfig,
    store: &dyn RecordStore,
    spec: QuerySpec,
) -> FetchResult<ListPage> {
    tracing::debug!(
        collection = %spec.collection,
        equalities = spec.equalities.len(),
        search = spec.search.is_some(),
        range = ?spec.range,
        "Executing list query"
    );

    let response = store.execute(&spec).await.map_err(|e| {
        tracing::debug!(collection = %spec.collection, error = %e, "List query failed");
        FetchError::DataAccess(e)
    })?;

    let data = config.transform_rows(response.rows);
    let total = response.count.unwrap_or(0);

    tracing::debug!(
        collection = %spec.collection,
        rows = data.len(),
        total,
        "List query completed"
    );

    Ok(ListPage { data, total })
}

/// Client-context fetcher
///
/// Runs queries without identity scoping; access control is the store's job.
#[derive(Clone)]
pub struct ClientFetcher {
    config: ListConfig,
    store: Arc<dyn RecordStore>,
}

impl ClientFetcher {
    pub fn new(config: ListConfig, store: Arc<dyn RecordStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Fetch one page
    pub async fn fetch(&self, request: &ListRequest) -> FetchResult<ListPage> {
        let spec = build_query(&self.config, request, Scope::Unscoped)?;
        execute(&self.config, self.store.as_ref(), spec).await
    }
}

/// Server-context fetcher
///
/// When the list is scoped, the caller is resolved once per call and every
/// query is restricted to the caller's rows. No query is issued without a
/// caller.
#[derive(Clone)]
pub struct ServerFetcher {
    config: ListConfig,
    store: Arc<dyn RecordStore>,
    session: Arc<dyn SessionProvider>,
}

impl ServerFetcher {
    pub fn new(
        config: ListConfig,
        store: Arc<dyn RecordStore>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            config,
            store,
            session,
        }
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Fetch one page as the caller known to the constructor's session
    pub async fn fetch(&self, request: &ListRequest) -> FetchResult<ListPage> {
        self.fetch_with_session(self.session.as_ref(), request)
            .await
    }

    /// Fetch one page as the caller known to `session`
    pub async fn fetch_with_session(
        &self,
        session: &dyn SessionProvider,
        request: &ListRequest,
    ) -> FetchResult<ListPage> {
        request.validate()?;

        let caller = match self.config.scope_column() {
            Some(_) => Some(resolve_caller(session, self.config.collection()).await?),
            None => None,
        };

        let scope = match (self.config.scope_column(), caller.as_ref()) {
            (Some(column), Some(caller)) => Scope::Owner { column, caller },
            _ => Scope::Unscoped,
        };

        let spec = build_query(&self.config, request, scope)?;
        execute(&self.config, self.store.as_ref(), spec).await
    }
}

async fn resolve_caller(
    session: &dyn SessionProvider,
    collection: &str,
) -> FetchResult<CallerIdentity> {
    match session.current_user().await {
        Ok(Some(caller)) => Ok(caller),
        Ok(None) => {
            tracing::warn!(collection, "Scoped list requested without a signed-in caller");
            Err(FetchError::unauthenticated("no signed-in user"))
        }
        Err(e) => {
            tracing::warn!(collection, error = %e, "Session lookup failed");
            Err(FetchError::unauthenticated(format!(
                "session lookup failed: {}",
                e
            )))
        }
    }
}
