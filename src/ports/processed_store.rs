//! ProcessedOrderStore port - the persisted dedup ledger.
//!
//! Webhook deliveries may arrive more than once (sender retries, operator
//! reprocessing, restarts mid-pipeline). The processed-order set makes invite
//! handling idempotent: an order in the set is never invited again. The set
//! survives restarts through this port.

use async_trait::async_trait;
use std::collections::BTreeSet;

use super::StoreError;

/// Port for persisting the set of processed order codes.
#[async_trait]
pub trait ProcessedOrderStore: Send + Sync {
    /// Load the persisted set; empty when nothing was processed yet.
    async fn load(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Replace the persisted set with the given one.
    async fn save(&self, orders: &BTreeSet<String>) -> Result<(), StoreError>;
}
