//! Record store seam

use crate::core::error::StorageError;
use crate::core::spec::QuerySpec;
use async_trait::async_trait;
use serde_json::Value;

/// Raw answer of a store to a [`QuerySpec`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreResponse {
    /// Rows inside the requested window, in store order
    pub rows: Vec<Value>,

    /// Count of the filtered set, if the store reported one
    pub count: Option<u64>,
}

/// Trait for stores that can run a composed list query
///
/// Implementations run the query once and report failures verbatim; callers
/// never retry.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run the query and return the page rows plus the total count
    async fn execute(&self, spec: &QuerySpec) -> Result<StoreResponse, StorageError>;
}
