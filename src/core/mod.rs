//! Core module containing the list-fetching adapters and their contracts

pub mod adapter;
pub mod auth;
pub mod error;
pub mod filter;
pub mod query;
pub mod spec;
pub mod store;

pub use adapter::{ClientFetcher, ListConfig, ListConfigBuilder, RowTransform, ServerFetcher};
pub use auth::{CallerIdentity, HeaderSession, NoSession, SessionProvider, StaticSession};
pub use error::{ConfigError, FetchError, FetchResult, RequestError, StorageError};
pub use filter::FilterSelection;
pub use query::{ListPage, ListQueryParams, ListRequest, PaginationMeta, RowRange};
pub use spec::{OrderBy, QuerySpec, SearchGroup};
pub use store::{RecordStore, StoreResponse};
