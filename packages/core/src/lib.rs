//! Locality Core
//!
//! Data management for a three-level administrative hierarchy
//! (Region → Department → City): name resolution for display, code
//! allocation, record construction, and reconciliation of bulk imports
//! against the stored set.
//!
//! # Modules
//!
//! - [`models`] - Data structures (Locality, display rows, filters)
//! - [`hierarchy`] - Pure functions over a snapshot (index, formatter, codes, builder)
//! - [`db`] - Store trait with in-memory and JSON-file implementations
//! - [`services`] - LocalityService and the import flow
//! - [`config`] - File and environment configuration

pub mod config;
pub mod db;
pub mod hierarchy;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::LocalityConfig;
pub use models::*;
pub use services::*;
