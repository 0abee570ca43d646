//! Import payload parsing and export serialization.
//!
//! Import files are JSON arrays of locality objects in the wire format. Each
//! entry needs at least `Id` and `Code`; storage-internal fields such as
//! `_id` or `__v` are ignored.

use crate::models::{Locality, ValidationError};
use serde_json::Value;

const REQUIRED_FIELDS: [&str; 2] = ["Id", "Code"];

/// Parse raw file contents into incoming records
pub fn parse_import_str(raw: &str) -> Result<Vec<Locality>, ValidationError> {
    let payload: Value = serde_json::from_str(raw)
        .map_err(|e| ValidationError::InvalidPayload(format!("not valid JSON: {}", e)))?;
    parse_import_payload(payload)
}

/// Validate and convert an already-decoded payload.
///
/// Fails on the first malformed entry, so nothing downstream ever sees a
/// partially valid batch. A missing `CodeNumber` defaults to the entry's
/// `Code`.
pub fn parse_import_payload(payload: Value) -> Result<Vec<Locality>, ValidationError> {
    let Value::Array(entries) = payload else {
        return Err(ValidationError::InvalidPayload(
            "expected a JSON array of localities".to_string(),
        ));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| parse_entry(position, entry))
        .collect()
}

fn parse_entry(position: usize, entry: Value) -> Result<Locality, ValidationError> {
    let Some(object) = entry.as_object() else {
        return Err(ValidationError::InvalidPayload(format!(
            "entry {} is not an object",
            position
        )));
    };

    for field in REQUIRED_FIELDS {
        if object.get(field).map_or(true, Value::is_null) {
            return Err(ValidationError::MissingField(format!(
                "{} (entry {})",
                field, position
            )));
        }
    }

    let mut locality: Locality = serde_json::from_value(entry)
        .map_err(|e| ValidationError::InvalidPayload(format!("entry {}: {}", position, e)))?;

    if locality.code.trim().is_empty() {
        return Err(ValidationError::MissingField(format!(
            "Code (entry {})",
            position
        )));
    }
    locality.normalize();

    Ok(locality)
}

/// Serialize records as a pretty-printed JSON array in the wire format.
///
/// The output parses back through [`parse_import_str`] unchanged.
pub fn export_json(records: &[Locality]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}
