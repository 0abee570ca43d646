//! Persistence Layer
//!
//! This module defines how the core talks to storage:
//!
//! - [`LocalityStore`] - async trait describing the document-store operations
//!   the core needs (full read, filtered read, insert, replace, delete, upsert)
//! - [`MemoryStore`] - in-process implementation
//! - [`JsonFileStore`] - implementation persisting to one JSON file
//!
//! The production document store is an external collaborator; anything that
//! implements [`LocalityStore`] can be handed to the service layer.

mod error;
mod json_store;
mod locality_store;
mod memory_store;
mod table;

pub use error::StoreError;
pub use json_store::JsonFileStore;
pub use locality_store::{DeleteResult, LocalityStore, UpsertResult};
pub use memory_store::MemoryStore;
