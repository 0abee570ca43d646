//! Data Models
//!
//! This module contains the data structures shared by every layer:
//!
//! - `Locality` - The single Region/Department/City record
//! - `FormattedLocality` - Derived display row with resolved ancestor names
//! - `LocalityFilter` - Listing criteria understood by every store

mod filter;
mod formatted;
mod locality;

pub use filter::{CompiledFilter, LocalityFilter};
pub use formatted::{FormattedLocality, LocalityStats, PLACEHOLDER};
pub use locality::{default_timestamp, Locality, LocalityType, ValidationError};
