//! Business Services
//!
//! - `LocalityService` - CRUD over a store, display rows, import and export
//! - `import` - payload parsing, reconciliation, conflict resolution and
//!   chunked commit
//!
//! Services coordinate between the store layer and the pure hierarchy
//! functions.

pub mod error;
pub mod events;
pub mod import;
pub mod locality_service;

pub use error::LocalityServiceError;
pub use events::LocalityEvent;
pub use locality_service::LocalityService;

#[cfg(test)]
mod locality_service_test;
