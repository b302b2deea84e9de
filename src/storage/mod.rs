//! Storage implementations for different backends

#[cfg(feature = "in-memory")]
pub mod in_memory;
pub mod postgrest;

#[cfg(feature = "in-memory")]
pub use in_memory::InMemoryRecordStore;
#[cfg(feature = "postgrest")]
pub use postgrest::PostgrestStore;
