//! Locality Service
//!
//! Business logic over a [`LocalityStore`]: snapshot loading, display rows,
//! creation with allocated codes, replacement, deletion, export, and the
//! import flow (plan, resolve, chunked commit).
//!
//! # Snapshots
//!
//! Read paths work on an explicit snapshot returned by
//! [`LocalityService::load_snapshot`]. After any write, callers reload and
//! rebuild whatever they derived from the old snapshot. Successful writes are
//! also announced on the event channel (see
//! [`LocalityService::subscribe_to_events`]).
//!
//! # Examples
//!
//! ```no_run
//! # use locality_core::db::MemoryStore;
//! # use locality_core::models::LocalityType;
//! # use locality_core::services::LocalityService;
//! # use std::sync::Arc;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = LocalityService::new(Arc::new(MemoryStore::new()));
//!
//! let region = service.create_locality(LocalityType::Region, "Littoral", None).await?;
//! let department = service
//!     .create_locality(LocalityType::Department, "Wouri", Some(region.id))
//!     .await?;
//! service
//!     .create_locality(LocalityType::City, "Douala", Some(department.id))
//!     .await?;
//!
//! for row in service.formatted_rows().await? {
//!     println!("{} | {} | {} | {}", row.code, row.region, row.department, row.city);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::LocalityConfig;
use crate::db::{DeleteResult, LocalityStore, StoreError};
use crate::hierarchy::{
    build_locality, format_localities, next_code, next_code_number, HierarchyIndex, NewLocality,
};
use crate::models::{
    FormattedLocality, Locality, LocalityFilter, LocalityStats, LocalityType, ValidationError,
};
use crate::services::error::LocalityServiceError;
use crate::services::events::{LocalityEvent, EVENT_CHANNEL_CAPACITY};
use crate::services::import::{
    commit_in_chunks, export_json, reconcile, ImportPlan, ImportProgress, ImportReport,
    ImportSession, DEFAULT_CHUNK_SIZE,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct LocalityService {
    store: Arc<dyn LocalityStore>,

    /// Records per upsert call during imports
    chunk_size: usize,

    /// Broadcast channel for domain events
    event_tx: broadcast::Sender<LocalityEvent>,
}

impl LocalityService {
    pub fn new(store: Arc<dyn LocalityStore>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
            event_tx,
        }
    }

    pub fn with_config(store: Arc<dyn LocalityStore>, config: &LocalityConfig) -> Self {
        Self::new(store).with_chunk_size(config.import_chunk_size)
    }

    /// Override the import chunk size (zero is treated as one)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn store(&self) -> &Arc<dyn LocalityStore> {
        &self.store
    }

    pub fn subscribe_to_events(&self) -> broadcast::Receiver<LocalityEvent> {
        self.event_tx.subscribe()
    }

    /// Ignores send errors; having no subscriber is normal.
    fn emit_event(&self, event: LocalityEvent) {
        debug!("Emitting {} event", event.event_type());
        let _ = self.event_tx.send(event);
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Every stored locality, in storage order
    pub async fn load_snapshot(&self) -> Result<Vec<Locality>, LocalityServiceError> {
        Ok(self.store.load_all().await?)
    }

    pub async fn list(&self, filter: &LocalityFilter) -> Result<Vec<Locality>, LocalityServiceError> {
        let compiled = filter.compile()?;
        Ok(self.store.find(&compiled).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Locality, LocalityServiceError> {
        self.store
            .find_by_ids(&[id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LocalityServiceError::not_found(id))
    }

    /// Display rows for the whole table, in default order
    pub async fn formatted_rows(&self) -> Result<Vec<FormattedLocality>, LocalityServiceError> {
        let snapshot = self.load_snapshot().await?;
        Ok(format_localities(&snapshot))
    }

    pub async fn stats(&self) -> Result<LocalityStats, LocalityServiceError> {
        let rows = self.formatted_rows().await?;
        Ok(LocalityStats::from_rows(&rows))
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create a locality with the next free code and code number.
    ///
    /// The parent must exist and sit one level above `type_id`. Codes are
    /// allocated from the snapshot read here, so a concurrent creation can
    /// take the same code; the store then rejects this insert with
    /// [`LocalityServiceError::DuplicateKey`].
    #[instrument(skip(self), level = "debug")]
    pub async fn create_locality(
        &self,
        type_id: LocalityType,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<Locality, LocalityServiceError> {
        let snapshot = self.load_snapshot().await?;
        HierarchyIndex::new(&snapshot).check_parent(type_id, parent_id)?;

        let locality = build_locality(NewLocality {
            type_id,
            name: name.to_string(),
            parent_id,
            code: next_code(&snapshot),
            code_number: next_code_number(&snapshot),
        })?;

        let mut created = self.store.insert_many(vec![locality]).await?;
        let locality = created
            .pop()
            .ok_or_else(|| StoreError::unavailable("insert returned no record"))?;

        info!(
            "Created {} {} '{}' (code {})",
            locality.type_id, locality.id, locality.name, locality.code
        );
        self.emit_event(LocalityEvent::Created(vec![locality.clone()]));
        Ok(locality)
    }

    /// Insert fully formed records; all or nothing
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn create_many(
        &self,
        records: Vec<Locality>,
    ) -> Result<Vec<Locality>, LocalityServiceError> {
        if records.is_empty() {
            return Err(ValidationError::InvalidPayload("payload cannot be empty".to_string()).into());
        }

        let created = self.store.insert_many(records).await?;
        info!("Inserted {} localities", created.len());
        self.emit_event(LocalityEvent::Created(created.clone()));
        Ok(created)
    }

    /// Replace the stored record `id` with `record` as a whole
    #[instrument(skip(self, record))]
    pub async fn replace_locality(
        &self,
        id: i64,
        record: Locality,
    ) -> Result<Locality, LocalityServiceError> {
        if record.id != id {
            return Err(ValidationError::IdMismatch {
                expected: id,
                actual: record.id,
            }
            .into());
        }

        let replaced = self
            .store
            .replace_one(id, record)
            .await?
            .ok_or_else(|| LocalityServiceError::not_found(id))?;

        info!("Replaced locality {}", id);
        self.emit_event(LocalityEvent::Updated(replaced.clone()));
        Ok(replaced)
    }

    #[instrument(skip(self))]
    pub async fn delete_locality(&self, id: i64) -> Result<(), LocalityServiceError> {
        if !self.store.delete_one(id).await? {
            return Err(LocalityServiceError::not_found(id));
        }

        info!("Deleted locality {}", id);
        self.emit_event(LocalityEvent::Deleted { ids: vec![id] });
        Ok(())
    }

    /// Delete every listed id that exists; unknown ids are ignored.
    ///
    /// The emitted event carries only the ids actually removed.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete_localities(&self, ids: &[i64]) -> Result<DeleteResult, LocalityServiceError> {
        let result = self.store.delete_many(ids).await?;

        info!("Deleted {} of {} requested localities", result.deleted_count, ids.len());
        if result.deleted_count > 0 {
            self.emit_event(LocalityEvent::Deleted {
                ids: result.deleted_ids.clone(),
            });
        }
        Ok(result)
    }

    // ========================================================================
    // Export / Import
    // ========================================================================

    /// Pretty JSON array of the selected records, or of every record
    pub async fn export(&self, ids: Option<&[i64]>) -> Result<String, LocalityServiceError> {
        let records = match ids {
            Some(ids) => self.store.find_by_ids(ids).await?,
            None => self.load_snapshot().await?,
        };

        debug!("Exporting {} localities", records.len());
        export_json(&records)
            .map_err(|e| StoreError::Serialization(e).into())
    }

    /// Reconcile incoming records against a fresh snapshot
    #[instrument(skip(self, incoming), fields(count = incoming.len()))]
    pub async fn plan_import(
        &self,
        incoming: Vec<Locality>,
    ) -> Result<ImportPlan, LocalityServiceError> {
        let snapshot = self.load_snapshot().await?;
        let plan = reconcile(incoming, &snapshot);

        info!(
            "Import plan: {} new, {} conflicting, {} unchanged",
            plan.pure_new.len(),
            plan.conflicts.len(),
            plan.unchanged.len()
        );
        Ok(plan)
    }

    /// Commit the batch of a finalized session in chunks.
    ///
    /// Fails with [`LocalityServiceError::InvalidTransition`] unless the
    /// session has reached its final state. On success the session is back
    /// to awaiting input.
    pub async fn commit_import<F>(
        &self,
        session: &mut ImportSession,
        on_progress: F,
    ) -> Result<ImportReport, LocalityServiceError>
    where
        F: FnMut(ImportProgress),
    {
        let batch = session.take_batch()?;
        let report = commit_in_chunks(self.store.as_ref(), batch, self.chunk_size, on_progress).await?;

        self.emit_event(LocalityEvent::Imported(report.result));
        Ok(report)
    }
}
