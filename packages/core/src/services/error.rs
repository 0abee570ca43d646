//! Service Layer Error Types
//!
//! This module defines the errors surfaced to callers of the service layer.
//! Duplicate keys are reported separately from other persistence failures so
//! callers can offer a targeted remedy (pick another code, reload and retry).

use crate::db::StoreError;
use crate::models::ValidationError;
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum LocalityServiceError {
    /// Target locality not found by id
    #[error("Locality not found: {id}")]
    NotFound { id: i64 },

    /// Input failed validation before anything was written
    #[error("Locality validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// A record with the same Id, Code or CodeNumber already exists
    #[error("Duplicate key error: a locality with {field} '{value}' already exists")]
    DuplicateKey { field: &'static str, value: String },

    /// Any other storage failure
    #[error("Persistence failed: {0}")]
    Persistence(StoreError),

    /// A chunk of an import failed; earlier chunks stay committed
    #[error(
        "Import aborted at chunk {chunk_index}: {committed} records committed, {not_attempted} not attempted: {source}"
    )]
    ImportAborted {
        committed: usize,
        not_attempted: usize,
        chunk_index: usize,
        source: StoreError,
    },

    /// A conflict-resolution decision that does not apply to the current step
    #[error("Invalid import transition: cannot apply '{decision}' while {state}")]
    InvalidTransition {
        state: &'static str,
        decision: &'static str,
    },
}

impl LocalityServiceError {
    /// Create a not found error
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Create an aborted import error
    pub fn import_aborted(
        committed: usize,
        not_attempted: usize,
        chunk_index: usize,
        source: StoreError,
    ) -> Self {
        Self::ImportAborted {
            committed,
            not_attempted,
            chunk_index,
            source,
        }
    }

    /// Create an invalid transition error
    pub fn invalid_transition(state: &'static str, decision: &'static str) -> Self {
        Self::InvalidTransition { state, decision }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}

impl From<StoreError> for LocalityServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { field, value } => Self::DuplicateKey { field, value },
            other => Self::Persistence(other),
        }
    }
}
