//! RoutingStore port - persisted routing-table snapshots.

use async_trait::async_trait;

use crate::domain::routing::RoutingTable;

use super::StoreError;

/// Port for loading and saving the routing table.
///
/// The table persists as one full snapshot mirroring its logical shape; every
/// mutation rewrites the whole snapshot (O(total associations) per write),
/// and startup reloads it wholesale.
#[async_trait]
pub trait RoutingStore: Send + Sync {
    /// Load the persisted table; `None` when no snapshot exists yet.
    async fn load(&self) -> Result<Option<RoutingTable>, StoreError>;

    /// Replace the persisted snapshot with the given table.
    async fn save(&self, table: &RoutingTable) -> Result<(), StoreError>;
}
