//! Server module exposing registered lists over HTTP
//!
//! The `ServerBuilder` registers:
//! - `/health` and `/healthz`
//! - `GET /lists` and `GET /lists/{name}` for every registered list

pub mod builder;
pub mod handlers;
pub mod list_registry;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use list_registry::{ListRegistry, RegisteredList};
