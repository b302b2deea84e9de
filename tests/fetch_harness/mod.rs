//! Shared test harness for list fetching
//!
//! Provides `RecordingStore`, a `RecordStore` double that records every
//! composed `QuerySpec` and answers with a canned response, plus fixtures for
//! the vehicles list.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod fetch_harness;
//! use fetch_harness::*;
//! ```

#![allow(dead_code)]

use async_trait::async_trait;
use fleetdesk::core::adapter::ListConfig;
use fleetdesk::core::error::StorageError;
use fleetdesk::core::spec::QuerySpec;
use fleetdesk::core::store::{RecordStore, StoreResponse};
use fleetdesk::storage::InMemoryRecordStore;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// RecordingStore
// ---------------------------------------------------------------------------

/// Store double recording every query it is asked to run
#[derive(Clone)]
pub struct RecordingStore {
    calls: Arc<Mutex<Vec<QuerySpec>>>,
    response: Arc<Mutex<Result<StoreResponse, StorageError>>>,
}

impl RecordingStore {
    /// Answer every query with `rows` and `count`
    pub fn answering(rows: Vec<Value>, count: Option<u64>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response: Arc::new(Mutex::new(Ok(StoreResponse { rows, count }))),
        }
    }

    /// Answer every query with no rows and a zero count
    pub fn empty() -> Self {
        Self::answering(Vec::new(), Some(0))
    }

    /// Fail every query with `error`
    pub fn failing(error: StorageError) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response: Arc::new(Mutex::new(Err(error))),
        }
    }

    pub fn calls(&self) -> Vec<QuerySpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The only recorded query; panics unless exactly one was issued
    pub fn single_call(&self) -> QuerySpec {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one store call");
        calls.into_iter().next().unwrap()
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn execute(&self, spec: &QuerySpec) -> Result<StoreResponse, StorageError> {
        self.calls.lock().unwrap().push(spec.clone());
        self.response.lock().unwrap().clone()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// The vehicles list as the back office configures it
pub fn vehicles_config() -> ListConfig {
    ListConfig::builder("vehicles")
        .order_by("created_at", false)
        .search_fields(["plate", "model", "brand"])
        .map_filter("type", "vehicle_type")
        .build()
        .expect("vehicles config should be valid")
}

/// The vehicles list scoped to the owning user
pub fn owned_vehicles_config() -> ListConfig {
    ListConfig::builder("vehicles")
        .order_by("created_at", false)
        .search_fields(["plate", "model", "brand"])
        .scope_by_user_field("user_id")
        .build()
        .expect("owned vehicles config should be valid")
}

pub fn vehicle(id: u64, plate: &str, model: &str, brand: &str, status: &str, owner: &str) -> Value {
    json!({
        "id": id,
        "plate": plate,
        "model": model,
        "brand": brand,
        "status": status,
        "user_id": owner,
        "created_at": format!("2024-01-{:02}T08:00:00Z", id),
    })
}

/// 25 vehicles split between two owners
///
/// Owner `a` holds odd ids, owner `b` even ids. Every third vehicle is
/// inactive; plates of ids divisible by 5 contain "ABC".
pub fn seeded_store(owner_a: &str, owner_b: &str) -> InMemoryRecordStore {
    let store = InMemoryRecordStore::new();
    let rows = (1..=25u64).map(|id| {
        let owner = if id % 2 == 1 { owner_a } else { owner_b };
        let status = if id % 3 == 0 { "inactive" } else { "active" };
        let plate = if id % 5 == 0 {
            format!("ABC-{:04}", id)
        } else {
            format!("XYZ-{:04}", id)
        };
        vehicle(id, &plate, "Sprinter", "Mercedes", status, owner)
    });
    store
        .extend("vehicles", rows)
        .expect("seeding should succeed");
    store
}
