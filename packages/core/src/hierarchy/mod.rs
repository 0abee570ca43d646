//! Hierarchy Engine
//!
//! Pure functions over an explicitly passed snapshot of localities:
//!
//! - [`HierarchyIndex`] - id lookup and ancestor resolution
//! - [`format_localities`] - display rows with resolved names
//! - [`next_code`] / [`next_code_number`] - code allocation
//! - [`build_locality`] - full record synthesis from minimal input
//!
//! Nothing in this module fails on a malformed hierarchy: dangling parents
//! degrade to placeholders and unparseable codes are skipped.

pub mod builder;
pub mod codes;
pub mod formatter;
pub mod index;

pub use builder::{build_locality, NewLocality};
pub use codes::{next_code, next_code_number, parse_code};
pub use formatter::{format_localities, format_locality, search_rows};
pub use index::{HierarchyIndex, MAX_ANCESTOR_HOPS};
