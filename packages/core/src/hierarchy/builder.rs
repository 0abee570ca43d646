//! Node Builder
//!
//! Synthesizes a complete [`Locality`] from the handful of values a user
//! actually supplies when adding a Region, Department or City.

use crate::hierarchy::codes::parse_code;
use crate::models::{Locality, LocalityType, ValidationError};
use serde::{Deserialize, Serialize};

/// Minimal input for a new locality
///
/// `code` and `code_number` normally come from
/// [`next_code`](crate::hierarchy::next_code) and
/// [`next_code_number`](crate::hierarchy::next_code_number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocality {
    pub type_id: LocalityType,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub code: String,
    pub code_number: String,
}

/// Build a full record from [`NewLocality`].
///
/// - The name is upper-cased and trimmed.
/// - `id` is the integer value of `code`; identifier and code share one
///   sequence.
/// - `nist_code` mirrors `code_number`.
/// - Every auxiliary field is at its canonical default.
///
/// Parent/type consistency is not checked here; see
/// [`HierarchyIndex::check_parent`](crate::hierarchy::HierarchyIndex::check_parent).
pub fn build_locality(input: NewLocality) -> Result<Locality, ValidationError> {
    let name = input.name.to_uppercase().trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::MissingField("Name".to_string()));
    }

    let id = parse_code(&input.code).ok_or_else(|| ValidationError::InvalidCode(input.code.clone()))?;

    let mut locality = Locality::new(
        id,
        input.code,
        input.code_number.clone(),
        name,
        input.type_id,
        input.parent_id,
    );
    locality.nist_code = Some(input.code_number);
    Ok(locality)
}
