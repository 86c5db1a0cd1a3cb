//! Storage adapters - file-backed and in-memory snapshot stores.
//!
//! Each port has two interchangeable implementations selected at
//! construction: the file-backed one for deployments, the in-memory one for
//! tests and ephemeral runs.

mod file_stores;
mod in_memory_stores;

pub use file_stores::{FileProcessedOrderStore, FileRoutingStore, FileTokenStore};
pub use in_memory_stores::{
    InMemoryProcessedOrderStore, InMemoryRoutingStore, InMemoryTokenStore,
};
