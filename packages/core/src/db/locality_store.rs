//! LocalityStore Trait - Persistence Abstraction
//!
//! This module defines the `LocalityStore` trait, the only view the core has
//! of the document store that holds localities. The production backend is an
//! external collaborator; [`MemoryStore`](crate::db::MemoryStore) and
//! [`JsonFileStore`](crate::db::JsonFileStore) implement the same contract.
//!
//! # Contract
//!
//! - Every call is atomic with respect to other calls on the same store.
//! - `Id`, `Code` and `CodeNumber` are each unique across all records.
//! - `upsert_batch` targets an existing record when **any** of the three keys
//!   matches; there is no multi-call transaction.
//!
//! # Examples
//!
//! ```rust,no_run
//! use locality_core::db::{LocalityStore, MemoryStore};
//! use locality_core::models::{Locality, LocalityType};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: Arc<dyn LocalityStore> = Arc::new(MemoryStore::new());
//!
//!     let region = Locality::new(1, "1", "1", "LITTORAL", LocalityType::Region, None);
//!     store.insert_many(vec![region]).await?;
//!
//!     assert_eq!(store.load_all().await?.len(), 1);
//!     Ok(())
//! }
//! ```

use crate::db::StoreError;
use crate::models::{CompiledFilter, Locality};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of an upsert batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResult {
    /// Records that targeted an existing record
    pub matched: usize,
    /// Matched records whose stored value actually changed
    pub modified: usize,
    /// Records with no match, inserted as new
    pub inserted: usize,
}

impl UpsertResult {
    /// Accumulate another batch's counts
    pub fn merge(&mut self, other: UpsertResult) {
        self.matched += other.matched;
        self.modified += other.modified;
        self.inserted += other.inserted;
    }
}

/// Outcome of a bulk delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: usize,
    /// Ids that existed and were removed, in storage order
    #[serde(default)]
    pub deleted_ids: Vec<i64>,
}

/// Abstraction layer for locality persistence
///
/// Implementations must be `Send + Sync` so services can share them behind
/// an `Arc` across tasks.
#[async_trait]
pub trait LocalityStore: Send + Sync {
    /// Full, unfiltered read. Used to build snapshots.
    async fn load_all(&self) -> Result<Vec<Locality>, StoreError>;

    /// Records matching a compiled filter, in storage order
    async fn find(&self, filter: &CompiledFilter) -> Result<Vec<Locality>, StoreError>;

    /// Records whose id is in `ids`, in storage order. Unknown ids are ignored.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Locality>, StoreError>;

    /// Insert new records.
    ///
    /// Rejects the whole batch with [`StoreError::DuplicateKey`] if any record
    /// collides with a stored record or with another record of the batch.
    async fn insert_many(&self, records: Vec<Locality>) -> Result<Vec<Locality>, StoreError>;

    /// Replace the record with `id` wholesale.
    ///
    /// Returns `Ok(None)` when no record has that id.
    async fn replace_one(&self, id: i64, record: Locality)
        -> Result<Option<Locality>, StoreError>;

    /// Delete one record. Returns whether it existed.
    async fn delete_one(&self, id: i64) -> Result<bool, StoreError>;

    /// Delete every record whose id is in `ids`
    async fn delete_many(&self, ids: &[i64]) -> Result<DeleteResult, StoreError>;

    /// Replace-or-insert each record, matched by `id OR code OR code_number`.
    async fn upsert_batch(&self, records: Vec<Locality>) -> Result<UpsertResult, StoreError>;
}
