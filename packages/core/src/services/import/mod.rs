//! Import Reconciliation
//!
//! An import runs in four steps:
//!
//! 1. [`parse_import_str`] validates the file and yields incoming records
//! 2. [`reconcile`] partitions them against the current snapshot
//! 3. [`next_state`] (or an [`ImportSession`]) walks the user's conflict
//!    decisions to a final batch
//! 4. [`commit_in_chunks`] upserts that batch
//!
//! [`LocalityService`](crate::services::LocalityService) wires the steps to a
//! store.

mod commit;
mod payload;
mod reconciler;
mod resolution;

pub use commit::{commit_in_chunks, ImportProgress, ImportReport, DEFAULT_CHUNK_SIZE};
pub use payload::{export_json, parse_import_payload, parse_import_str};
pub use reconciler::{reconcile, Conflict, ImportPlan};
pub use resolution::{next_state, Decision, ImportSession, ResolutionState};
