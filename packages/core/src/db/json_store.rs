//! JsonFileStore - File-Backed LocalityStore
//!
//! Persists the whole table as a pretty-printed JSON array, the same shape
//! the import and export files use. Every mutation is staged in memory,
//! written to a temporary file and renamed over the original, so a crash
//! mid-write never leaves a truncated file behind.

use crate::db::table::LocalityTable;
use crate::db::{DeleteResult, LocalityStore, StoreError, UpsertResult};
use crate::models::{CompiledFilter, Locality};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// LocalityStore implementation backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: RwLock<LocalityTable>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    ///
    /// Parent directories are created on first write, not here.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let records = if fs::try_exists(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?
        {
            let contents = fs::read_to_string(&path)
                .await
                .map_err(|e| StoreError::io(&path, e))?;
            if contents.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str::<Vec<Locality>>(&contents)?
            }
        } else {
            Vec::new()
        };

        info!("Opened locality store at {:?} ({} records)", path, records.len());

        Ok(Self {
            path,
            table: RwLock::new(LocalityTable::from_records(records)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `op` to a staged copy, persist it, then publish it.
    ///
    /// The write lock is held across the file write so concurrent mutations
    /// are serialized.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut LocalityTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut table = self.table.write().await;
        let mut staged = table.clone();
        let outcome = op(&mut staged)?;

        self.persist(staged.records()).await?;
        *table = staged;
        Ok(outcome)
    }

    async fn persist(&self, records: &[Locality]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::io(parent, e))?;
            }
        }

        let json = serde_json::to_string_pretty(records)?;
        let temp_path = self.path.with_extension("json.tmp");

        fs::write(&temp_path, json)
            .await
            .map_err(|e| StoreError::io(&temp_path, e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        debug!("Persisted {} records to {:?}", records.len(), self.path);
        Ok(())
    }
}

#[async_trait]
impl LocalityStore for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<Locality>, StoreError> {
        Ok(self.table.read().await.records().to_vec())
    }

    async fn find(&self, filter: &CompiledFilter) -> Result<Vec<Locality>, StoreError> {
        Ok(self.table.read().await.find(filter))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Locality>, StoreError> {
        Ok(self.table.read().await.find_by_ids(ids))
    }

    async fn insert_many(&self, records: Vec<Locality>) -> Result<Vec<Locality>, StoreError> {
        self.mutate(|table| table.insert_many(records)).await
    }

    async fn replace_one(
        &self,
        id: i64,
        record: Locality,
    ) -> Result<Option<Locality>, StoreError> {
        self.mutate(|table| table.replace_one(id, record)).await
    }

    async fn delete_one(&self, id: i64) -> Result<bool, StoreError> {
        self.mutate(|table| Ok(table.delete_one(id))).await
    }

    async fn delete_many(&self, ids: &[i64]) -> Result<DeleteResult, StoreError> {
        self.mutate(|table| Ok(table.delete_many(ids))).await
    }

    async fn upsert_batch(&self, records: Vec<Locality>) -> Result<UpsertResult, StoreError> {
        self.mutate(|table| table.upsert_batch(records)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocalityType;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path().join("localities.json"))
            .await
            .unwrap();

        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("localities.json");

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            let region = Locality::new(1, "1", "1", "LITTORAL", LocalityType::Region, None);
            store.insert_many(vec![region]).await.unwrap();
            store
                .upsert_batch(vec![Locality::new(
                    2,
                    "2",
                    "2",
                    "WOURI",
                    LocalityType::Department,
                    Some(1),
                )])
                .await
                .unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let records = reopened.load_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parent_id, Some(1));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_mutation_is_not_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("localities.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        let region = Locality::new(1, "1", "1", "LITTORAL", LocalityType::Region, None);
        store.insert_many(vec![region.clone()]).await.unwrap();
        assert!(store.insert_many(vec![region]).await.is_err());

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupted_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("localities.json");
        std::fs::write(&path, "{ not an array").unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
