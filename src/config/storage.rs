//! Storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Snapshot storage configuration
///
/// The routing table, OAuth credential, and processed-order set are persisted
/// as JSON snapshots inside `data_dir`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted snapshots
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Path of the routing table snapshot
    pub fn routing_path(&self) -> PathBuf {
        self.data_dir.join("event_rooms.json")
    }

    /// Path of the persisted OAuth credential
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join("pretix_token.json")
    }

    /// Path of the processed-order snapshot
    pub fn processed_path(&self) -> PathBuf {
        self.data_dir.join("processed_orders.json")
    }

    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyDataDir);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
