//! Chunked commit of a finalized import batch.
//!
//! The batch is upserted in fixed-size chunks, one at a time. A failing
//! chunk stops the commit; chunks already written stay written and the
//! error reports how far the commit got.

use crate::db::{LocalityStore, UpsertResult};
use crate::models::Locality;
use crate::services::error::LocalityServiceError;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Default number of records per upsert call
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Progress reported after each committed chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    pub committed: usize,
    pub total: usize,
    /// `round(committed / total * 100)`
    pub percent: u8,
}

impl ImportProgress {
    fn new(committed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((committed * 100 + total / 2) / total).min(100) as u8
        };
        Self {
            committed,
            total,
            percent,
        }
    }
}

/// Summary of a fully committed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total: usize,
    pub chunks: usize,
    pub result: UpsertResult,
}

/// Upsert `batch` in chunks of `chunk_size`, calling `on_progress` after
/// each one.
///
/// Chunks preserve batch order. A chunk size of zero is treated as one.
pub async fn commit_in_chunks<F>(
    store: &dyn LocalityStore,
    batch: Vec<Locality>,
    chunk_size: usize,
    mut on_progress: F,
) -> Result<ImportReport, LocalityServiceError>
where
    F: FnMut(ImportProgress),
{
    let chunk_size = chunk_size.max(1);
    let total = batch.len();
    let mut report = ImportReport {
        total,
        ..ImportReport::default()
    };
    let mut committed = 0;

    info!("Committing {} localities in chunks of {}", total, chunk_size);

    for (chunk_index, chunk) in batch.chunks(chunk_size).enumerate() {
        let len = chunk.len();
        match store.upsert_batch(chunk.to_vec()).await {
            Ok(result) => {
                committed += len;
                report.chunks += 1;
                report.result.merge(result);

                let progress = ImportProgress::new(committed, total);
                debug!(
                    "Chunk {} committed ({}/{}, {}%)",
                    chunk_index, committed, total, progress.percent
                );
                on_progress(progress);
            }
            Err(err) => {
                warn!(
                    "Import aborted at chunk {}: {} committed, {} not attempted: {}",
                    chunk_index,
                    committed,
                    total - committed,
                    err
                );
                return Err(LocalityServiceError::import_aborted(
                    committed,
                    total - committed,
                    chunk_index,
                    err,
                ));
            }
        }
    }

    info!(
        "Import committed: {} matched, {} modified, {} inserted",
        report.result.matched, report.result.modified, report.result.inserted
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DeleteResult, MemoryStore, StoreError};
    use crate::models::{CompiledFilter, LocalityType};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn batch(n: i64) -> Vec<Locality> {
        (1..=n)
            .map(|id| Locality::new(id, id.to_string(), id.to_string(), "X", LocalityType::City, None))
            .collect()
    }

    /// Records every upsert call and fails the call at `fail_at`
    struct RecordingStore {
        inner: MemoryStore,
        calls: Mutex<Vec<usize>>,
        fail_at: Option<usize>,
    }

    impl RecordingStore {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                inner: MemoryStore::new(),
                calls: Mutex::new(Vec::new()),
                fail_at,
            }
        }
    }

    #[async_trait]
    impl LocalityStore for RecordingStore {
        async fn load_all(&self) -> Result<Vec<Locality>, StoreError> {
            self.inner.load_all().await
        }
        async fn find(&self, filter: &CompiledFilter) -> Result<Vec<Locality>, StoreError> {
            self.inner.find(filter).await
        }
        async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Locality>, StoreError> {
            self.inner.find_by_ids(ids).await
        }
        async fn insert_many(&self, records: Vec<Locality>) -> Result<Vec<Locality>, StoreError> {
            self.inner.insert_many(records).await
        }
        async fn replace_one(&self, id: i64, record: Locality) -> Result<Option<Locality>, StoreError> {
            self.inner.replace_one(id, record).await
        }
        async fn delete_one(&self, id: i64) -> Result<bool, StoreError> {
            self.inner.delete_one(id).await
        }
        async fn delete_many(&self, ids: &[i64]) -> Result<DeleteResult, StoreError> {
            self.inner.delete_many(ids).await
        }
        async fn upsert_batch(&self, records: Vec<Locality>) -> Result<UpsertResult, StoreError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(records.len());
                calls.len() - 1
            };
            if self.fail_at == Some(call) {
                return Err(StoreError::unavailable("connection reset"));
            }
            self.inner.upsert_batch(records).await
        }
    }

    #[tokio::test]
    async fn test_commits_in_sequential_chunks() {
        let store = RecordingStore::new(None);
        let mut seen = Vec::new();

        let report = commit_in_chunks(&store, batch(250), 100, |p| seen.push(p.percent))
            .await
            .unwrap();

        assert_eq!(*store.calls.lock().unwrap(), vec![100, 100, 50]);
        assert_eq!(seen, vec![40, 80, 100]);
        assert_eq!(report.chunks, 3);
        assert_eq!(report.result.inserted, 250);
        assert_eq!(store.inner.len().await, 250);
    }

    #[tokio::test]
    async fn test_failing_chunk_stops_the_commit() {
        let store = RecordingStore::new(Some(1));
        let mut seen = Vec::new();

        let err = commit_in_chunks(&store, batch(250), 100, |p| seen.push(p.committed))
            .await
            .unwrap_err();

        match err {
            LocalityServiceError::ImportAborted {
                committed,
                not_attempted,
                chunk_index,
                ..
            } => {
                assert_eq!(committed, 100);
                assert_eq!(not_attempted, 150);
                assert_eq!(chunk_index, 1);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Third chunk never attempted, first chunk kept
        assert_eq!(*store.calls.lock().unwrap(), vec![100, 100]);
        assert_eq!(seen, vec![100]);
        assert_eq!(store.inner.len().await, 100);
    }

    #[tokio::test]
    async fn test_preserves_batch_order() {
        let store = MemoryStore::new();
        let records: Vec<Locality> = batch(5).into_iter().rev().collect();

        commit_in_chunks(&store, records, 2, |_| {}).await.unwrap();

        let ids: Vec<i64> = store.load_all().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn test_empty_batch_writes_nothing() {
        let store = RecordingStore::new(None);
        let report = commit_in_chunks(&store, Vec::new(), 100, |_| {}).await.unwrap();

        assert_eq!(report, ImportReport::default());
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_progress_rounds_like_a_percentage() {
        assert_eq!(ImportProgress::new(1, 3).percent, 33);
        assert_eq!(ImportProgress::new(2, 3).percent, 67);
        assert_eq!(ImportProgress::new(3, 3).percent, 100);
    }
}
