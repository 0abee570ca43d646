//! MemoryStore - In-Process LocalityStore
//!
//! Keeps every record in memory behind a `tokio::sync::RwLock`. Nothing
//! survives the process; useful for tests and dry runs.

use crate::db::table::LocalityTable;
use crate::db::{DeleteResult, LocalityStore, StoreError, UpsertResult};
use crate::models::{CompiledFilter, Locality};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// LocalityStore implementation holding records in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<LocalityTable>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.records().len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl LocalityStore for MemoryStore {
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
        self.table.write().await.insert_many(records)
    }

    async fn replace_one(
        &self,
        id: i64,
        record: Locality,
    ) -> Result<Option<Locality>, StoreError> {
        self.table.write().await.replace_one(id, record)
    }

    async fn delete_one(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.table.write().await.delete_one(id))
    }

    async fn delete_many(&self, ids: &[i64]) -> Result<DeleteResult, StoreError> {
        Ok(self.table.write().await.delete_many(ids))
    }

    async fn upsert_batch(&self, records: Vec<Locality>) -> Result<UpsertResult, StoreError> {
        self.table.write().await.upsert_batch(records)
    }
}
