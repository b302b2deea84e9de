//! # fleetdesk
//!
//! Paginated, filterable, searchable record lists for the fleet back office.
//!
//! ## Features
//!
//! - **One query protocol for every list**: pagination, multi-column OR search,
//!   filter-to-column mapping, default ordering, exact totals
//! - **Two execution contexts**: an unscoped client-context fetcher and a
//!   server-context fetcher that scopes every query to the signed-in caller
//! - **Immutable query specs**: queries are plain values, so any store (or a
//!   test double) receives exactly what was composed
//! - **Pluggable stores**: in-memory for tests and development, PostgREST for
//!   hosted databases (`postgrest` feature)
//! - **REST exposure**: `GET /lists/{name}` for every registered list
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fleetdesk::prelude::*;
//!
//! let store = Arc::new(InMemoryRecordStore::new());
//!
//! let config = ListConfig::builder("vehicles")
//!     .order_by("created_at", false)
//!     .search_fields(["plate", "model", "brand"])
//!     .build()?;
//!
//! let fetcher = ClientFetcher::new(config, store);
//! let page = fetcher
//!     .fetch(
//!         &ListRequest::new(1, 10)
//!             .with_search("ABC")
//!             .with_ui_filter("status", "active"),
//!     )
//!     .await?;
//!
//! println!("{} rows of {}", page.data.len(), page.total);
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Adapters ===
    pub use crate::core::adapter::{
        ClientFetcher, ListConfig, ListConfigBuilder, RowTransform, Scope, ServerFetcher,
        build_query,
    };

    // === Requests & Results ===
    pub use crate::core::{
        filter::FilterSelection,
        query::{
            ListPage, ListQueryParams, ListRequest, PaginatedResponse, PaginationMeta, RowRange,
            TypedListPage,
        },
        spec::{OrderBy, QuerySpec, SearchGroup},
    };

    // === Identity ===
    pub use crate::core::auth::{
        CallerIdentity, HeaderSession, NoSession, SessionProvider, StaticSession,
    };

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, FetchError, FetchResult, RequestError, StorageError,
    };

    // === Storage ===
    pub use crate::core::store::{RecordStore, StoreResponse};
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryRecordStore;
    #[cfg(feature = "postgrest")]
    pub use crate::storage::PostgrestStore;

    // === Config ===
    pub use crate::config::{ListDefinition, ListsConfig, OrderConfig};

    // === Server ===
    pub use crate::server::{ListRegistry, RegisteredList, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
