//! Fleet back-office list API
//!
//! This example demonstrates:
//! - Serving the fleet list catalogue over HTTP
//! - Seeding the in-memory store
//! - Owner-scoped lists (accounts, reports) read from the `x-user-id` header
//!
//! Try:
//! ```text
//! curl 'http://127.0.0.1:3000/lists/vehicles?search=abc&filter.status=active'
//! curl -H 'x-user-id: 6f1f7a4e-6f43-4d5e-9b0b-0d3f6c1f2a10' 'http://127.0.0.1:3000/lists/reports'
//! ```

use fleetdesk::prelude::*;
use tracing_subscriber::EnvFilter;

const DEMO_USER: &str = "6f1f7a4e-6f43-4d5e-9b0b-0d3f6c1f2a10";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,fleetdesk=debug")),
        )
        .init();

    let catalogue = match std::env::var("FLEETDESK_LISTS") {
        Ok(path) => ListsConfig::from_yaml_file(&path)?,
        Err(_) => ListsConfig::default_config(),
    };
    tracing::info!(lists = catalogue.lists.len(), "Loaded list catalogue");

    let store = InMemoryRecordStore::new();
    seed(&store)?;

    let addr = std::env::var("FLEETDESK_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    ServerBuilder::new()
        .with_store(store)
        .register_catalogue(&catalogue)?
        .serve(&addr)
        .await
}

fn seed(store: &InMemoryRecordStore) -> Result<()> {
    let other_user = Uuid::new_v4().to_string();

    store.extend(
        "vehicles",
        vec![
            json!({"id": 1, "plate": "ABC-1234", "model": "Sprinter", "brand": "Mercedes", "status": "active", "created_at": "2024-01-10T09:00:00Z"}),
            json!({"id": 2, "plate": "DEF-5678", "model": "Transit", "brand": "Ford", "status": "maintenance", "created_at": "2024-02-14T09:00:00Z"}),
            json!({"id": 3, "plate": "GHI-9012", "model": "Daily", "brand": "Iveco", "status": "active", "created_at": "2024-03-02T09:00:00Z"}),
        ],
    )?;
    store.extend(
        "employees",
        vec![
            json!({"id": 1, "name": "Ana Souza", "email": "ana@fleet.test", "phone": "+5511999990001", "position": "driver", "created_at": "2024-01-05T09:00:00Z"}),
            json!({"id": 2, "name": "Bruno Lima", "email": "bruno@fleet.test", "phone": "+5511999990002", "position": "dispatcher", "created_at": "2024-01-06T09:00:00Z"}),
        ],
    )?;
    store.extend(
        "services",
        vec![
            json!({"id": 1, "description": "Warehouse transfer", "origin": "Campinas", "destination": "Santos", "vehicle_id": "1", "employee_id": "1", "created_at": "2024-03-10T09:00:00Z"}),
        ],
    )?;
    store.extend(
        "accounts",
        vec![
            json!({"id": 1, "name": "Fuel card", "document": "FC-001", "account_type": "expense", "user_id": DEMO_USER, "created_at": "2024-01-01T09:00:00Z"}),
            json!({"id": 2, "name": "Tolls", "document": "TL-009", "account_type": "expense", "user_id": other_user, "created_at": "2024-01-02T09:00:00Z"}),
        ],
    )?;
    store.extend(
        "reports",
        vec![
            json!({"id": 1, "title": "March fuel usage", "user_id": DEMO_USER, "created_at": "2024-04-01T09:00:00Z"}),
            json!({"id": 2, "title": "March tolls", "user_id": other_user, "created_at": "2024-04-01T10:00:00Z"}),
        ],
    )?;

    Ok(())
}
