//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! domain and the outside world. Adapters implement these ports.
//!
//! - `ChatService` - opaque invite/alias capability of the chat platform
//! - `RoutingStore` - persisted routing-table snapshots
//! - `TokenStore` - persisted OAuth credential
//! - `ProcessedOrderStore` - persisted dedup ledger of processed orders

mod chat_service;
mod processed_store;
mod routing_store;
mod token_store;

pub use chat_service::{ChatError, ChatService, FailedInvite};
pub use processed_store::ProcessedOrderStore;
pub use routing_store::RoutingStore;
pub use token_store::TokenStore;

use thiserror::Error;

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(String),

    #[error("snapshot (de)serialization failed: {0}")]
    Serialization(String),
}
