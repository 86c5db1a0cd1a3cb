//! TokenStore port - persisted OAuth credential.

use async_trait::async_trait;

use crate::domain::ticketing::Credential;

use super::StoreError;

/// Port for persisting the ticketing API credential.
///
/// Saved before any call dependent on a freshly issued or refreshed token
/// proceeds, so a crash never loses a rotation; loaded at startup so restarts
/// do not force re-authorization.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the persisted credential; `None` when never authorized.
    async fn load(&self) -> Result<Option<Credential>, StoreError>;

    /// Persist the credential.
    async fn save(&self, credential: &Credential) -> Result<(), StoreError>;
}
