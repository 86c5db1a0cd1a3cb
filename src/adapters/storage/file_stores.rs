//! File-backed snapshot stores.
//!
//! Each store keeps one JSON document at a fixed path. Writes go to a
//! temporary sibling first and are renamed into place, so a crash mid-write
//! leaves the previous snapshot intact.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::routing::RoutingTable;
use crate::domain::ticketing::Credential;
use crate::ports::{ProcessedOrderStore, RoutingStore, StoreError, TokenStore};

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::read_to_string(path).await {
        Ok(contents) => serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| StoreError::Serialization(e.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io(e.to_string())),
    }
}

async fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?;
        }
    }

    // Temp-then-rename keeps the previous snapshot readable if we crash
    // between the two steps.
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json)
        .await
        .map_err(|e| StoreError::Io(e.to_string()))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::Io(e.to_string()))
}

/// Routing table snapshots on disk.
#[derive(Debug, Clone)]
pub struct FileRoutingStore {
    path: PathBuf,
}

impl FileRoutingStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RoutingStore for FileRoutingStore {
    async fn load(&self) -> Result<Option<RoutingTable>, StoreError> {
        read_json(&self.path).await
    }

    async fn save(&self, table: &RoutingTable) -> Result<(), StoreError> {
        write_json_atomic(&self.path, table).await
    }
}

/// OAuth credential on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        read_json(&self.path).await
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        write_json_atomic(&self.path, credential).await
    }
}

/// Processed-order set on disk, serialized as a sorted list of order codes.
#[derive(Debug, Clone)]
pub struct FileProcessedOrderStore {
    path: PathBuf,
}

impl FileProcessedOrderStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ProcessedOrderStore for FileProcessedOrderStore {
    async fn load(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }

    async fn save(&self, orders: &BTreeSet<String>) -> Result<(), StoreError> {
        write_json_atomic(&self.path, orders).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::routing::{FilterCondition, RoomAssociation};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[tokio::test]
    async fn routing_store_round_trips_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = FileRoutingStore::new(dir.path().join("event_rooms.json"));

        let mut table = RoutingTable::new();
        table.add("fedora", "flock", RoomAssociation::new("!abc:example.org"));
        table.add(
            "fedora",
            "flock",
            RoomAssociation::with_condition(
                "!abc:example.org",
                FilterCondition::for_item("548325"),
            ),
        );

        store.save(&table).await.unwrap();
        let reloaded = store.load().await.unwrap().unwrap();
        assert_eq!(reloaded, table);
    }

    #[tokio::test]
    async fn routing_store_missing_file_loads_none() {
        let dir = TempDir::new().unwrap();
        let store = FileRoutingStore::new(dir.path().join("missing.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn routing_store_corrupt_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("event_rooms.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = FileRoutingStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn token_store_round_trips_credential() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("pretix_token.json"));

        let credential = Credential {
            access_token: "atoken".to_string(),
            refresh_token: Some("rtoken".to_string()),
            token_type: "Bearer".to_string(),
            scope: ["read".to_string()].into(),
            expires_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };

        store.save(&credential).await.unwrap();
        let reloaded = store.load().await.unwrap().unwrap();
        assert_eq!(reloaded, credential);
    }

    #[tokio::test]
    async fn processed_store_defaults_to_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileProcessedOrderStore::new(dir.path().join("processed.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn processed_store_round_trips_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FileProcessedOrderStore::new(dir.path().join("processed.json"));

        let first: BTreeSet<String> = ["PNKYZ".to_string(), "A1B2C".to_string()].into();
        store.save(&first).await.unwrap();
        assert_eq!(store.load().await.unwrap(), first);

        let second: BTreeSet<String> = ["ZZZZZ".to_string()].into();
        store.save(&second).await.unwrap();
        assert_eq!(store.load().await.unwrap(), second);
    }

    #[tokio::test]
    async fn write_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileProcessedOrderStore::new(dir.path().join("nested/deep/processed.json"));
        store.save(&BTreeSet::new()).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed.json");
        let store = FileProcessedOrderStore::new(&path);
        store.save(&BTreeSet::new()).await.unwrap();

        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().into_string().unwrap());
        }
        assert_eq!(names, vec!["processed.json"]);
    }
}
