//! In-memory snapshot stores for tests and ephemeral deployments.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Mutex;

use crate::domain::routing::RoutingTable;
use crate::domain::ticketing::Credential;
use crate::ports::{ProcessedOrderStore, RoutingStore, StoreError, TokenStore};

/// Routing snapshots held in memory.
#[derive(Debug, Default)]
pub struct InMemoryRoutingStore {
    table: Mutex<Option<RoutingTable>>,
}

impl InMemoryRoutingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store with a table, as if a snapshot already existed.
    pub fn seeded(table: RoutingTable) -> Self {
        Self {
            table: Mutex::new(Some(table)),
        }
    }
}

#[async_trait]
impl RoutingStore for InMemoryRoutingStore {
    async fn load(&self) -> Result<Option<RoutingTable>, StoreError> {
        Ok(self.table.lock().expect("lock poisoned").clone())
    }

    async fn save(&self, table: &RoutingTable) -> Result<(), StoreError> {
        *self.table.lock().expect("lock poisoned") = Some(table.clone());
        Ok(())
    }
}

/// Credential held in memory.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    credential: Mutex<Option<Credential>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.credential.lock().expect("lock poisoned").clone())
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.credential.lock().expect("lock poisoned") = Some(credential.clone());
        Ok(())
    }
}

/// Processed-order set held in memory.
#[derive(Debug, Default)]
pub struct InMemoryProcessedOrderStore {
    orders: Mutex<BTreeSet<String>>,
}

impl InMemoryProcessedOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessedOrderStore for InMemoryProcessedOrderStore {
    async fn load(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.orders.lock().expect("lock poisoned").clone())
    }

    async fn save(&self, orders: &BTreeSet<String>) -> Result<(), StoreError> {
        *self.orders.lock().expect("lock poisoned") = orders.clone();
        Ok(())
    }
}
