//! Store Error Types
//!
//! This module defines error types for persistence operations. Duplicate-key
//! violations are kept distinct so the service layer can surface them as
//! conflicts rather than generic persistence failures.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique key (`Id`, `Code` or `CodeNumber`) is already taken
    #[error("Duplicate key error: {field} '{value}' already exists")]
    DuplicateKey { field: &'static str, value: String },

    /// Failed to read or write the backing file
    #[error("Failed to access store file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stored data could not be (de)serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend refused or could not complete the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create a duplicate key error
    pub fn duplicate_key(field: &'static str, value: impl ToString) -> Self {
        Self::DuplicateKey {
            field,
            value: value.to_string(),
        }
    }

    /// Create an I/O error for a store path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}
