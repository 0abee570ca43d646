//! Locality Data Structures
//!
//! This module defines the `Locality` record, the single entity of the
//! administrative hierarchy. Regions, Departments and Cities share one flat
//! shape and link to each other through `parent_id`.
//!
//! # Wire Format
//!
//! Records keep the field names of the exchange format used by import and
//! export files (`Id`, `Code`, `RegionStructureTypeId`, ...). Auxiliary fields
//! (owners, audit timestamps, translations) are carried opaquely: the core
//! never interprets them beyond keeping them present on write.
//!
//! # Examples
//!
//! ```rust
//! use locality_core::models::{Locality, LocalityType};
//!
//! let region = Locality::new(1, "1", "1", "LITTORAL", LocalityType::Region, None);
//! assert!(region.is_region());
//! assert_eq!(region.parent_id, None);
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Validation errors for Locality input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid locality type: {0}")]
    InvalidType(u8),

    #[error("Invalid code '{0}': expected a numeric code")]
    InvalidCode(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid import payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Record id {actual} does not match target id {expected}")]
    IdMismatch { expected: i64, actual: i64 },
}

/// Level of a locality in the three-level hierarchy
///
/// Serialized as its numeric identifier (1=Region, 2=Department, 3=City).
/// Ordering follows the hierarchy, which is also the default display order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum LocalityType {
    Region = 1,
    Department = 2,
    /// Records without a type are Cities, matching the storage default.
    #[default]
    City = 3,
}

impl LocalityType {
    /// Numeric identifier used on the wire
    pub fn id(self) -> u8 {
        self as u8
    }

    /// The type a parent of this type must have, if any
    pub fn expected_parent(self) -> Option<LocalityType> {
        match self {
            LocalityType::Region => None,
            LocalityType::Department => Some(LocalityType::Region),
            LocalityType::City => Some(LocalityType::Department),
        }
    }
}

impl TryFrom<u8> for LocalityType {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(LocalityType::Region),
            2 => Ok(LocalityType::Department),
            3 => Ok(LocalityType::City),
            other => Err(ValidationError::InvalidType(other)),
        }
    }
}

impl From<LocalityType> for u8 {
    fn from(value: LocalityType) -> Self {
        value.id()
    }
}

impl fmt::Display for LocalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LocalityType::Region => "region",
            LocalityType::Department => "department",
            LocalityType::City => "city",
        };
        f.write_str(label)
    }
}

/// Canonical audit timestamp for records that were never stamped
/// (`0001-01-01T00:00:00`).
pub fn default_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Accepts naive timestamps (`0001-01-01T00:00:00`), RFC 3339 timestamps as
/// produced by document stores (`...T00:00:00.000Z`), or null.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(default_timestamp());
    };

    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Ok(naive);
    }

    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.naive_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

/// Codes are strings on the wire, but hand-written files often carry them as
/// bare numbers.
fn deserialize_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number code, found {}",
            other
        ))),
    }
}

/// A Region, Department or City record.
///
/// # Fields
///
/// - `id`: Unique, stable identifier
/// - `code`: Unique human-facing code, also the default sort key
/// - `code_number`: Unique secondary code
/// - `name`: Display name
/// - `type_id`: Hierarchy level
/// - `parent_id`: `None` for Regions, a Region for Departments, a Department for Cities
///
/// The remaining fields are auxiliary and always carried at their defaults
/// unless an import supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locality {
    #[serde(rename = "Id")]
    pub id: i64,

    #[serde(rename = "Code", deserialize_with = "deserialize_code")]
    pub code: String,

    #[serde(rename = "CodeNumber", default, deserialize_with = "deserialize_code")]
    pub code_number: String,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "RegionStructureTypeId", default)]
    pub type_id: LocalityType,

    #[serde(rename = "ParentRegionStructureId", default)]
    pub parent_id: Option<i64>,

    #[serde(rename = "NistCode", default)]
    pub nist_code: Option<String>,

    #[serde(rename = "ChildrenRegionStructures", default)]
    pub children: Value,

    #[serde(rename = "ParentRegionStructure", default)]
    pub parent: Value,

    #[serde(rename = "RegionStructureType", default)]
    pub structure_type: Value,

    #[serde(rename = "CreatedBy", default)]
    pub created_by: Value,

    #[serde(
        rename = "CreatedDate",
        default = "default_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub created_date: NaiveDateTime,

    #[serde(rename = "ModifiedBy", default)]
    pub modified_by: Value,

    #[serde(
        rename = "ModifiedDate",
        default = "default_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub modified_date: NaiveDateTime,

    #[serde(rename = "Deleted", default)]
    pub deleted: bool,

    #[serde(rename = "IsDeletablePermanently", default)]
    pub is_deletable_permanently: bool,

    #[serde(rename = "Translations", default)]
    pub translations: Vec<Value>,
}

impl Locality {
    /// Create a locality with every auxiliary field at its canonical default
    pub fn new(
        id: i64,
        code: impl Into<String>,
        code_number: impl Into<String>,
        name: impl Into<String>,
        type_id: LocalityType,
        parent_id: Option<i64>,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            code_number: code_number.into(),
            name: name.into(),
            type_id,
            parent_id,
            nist_code: None,
            children: Value::Null,
            parent: Value::Null,
            structure_type: Value::Null,
            created_by: Value::Null,
            created_date: default_timestamp(),
            modified_by: Value::Null,
            modified_date: default_timestamp(),
            deleted: false,
            is_deletable_permanently: false,
            translations: Vec::new(),
        }
    }

    pub fn is_region(&self) -> bool {
        self.type_id == LocalityType::Region
    }

    pub fn is_department(&self) -> bool {
        self.type_id == LocalityType::Department
    }

    pub fn is_city(&self) -> bool {
        self.type_id == LocalityType::City
    }

    /// Whether any of the three unique keys (`id`, `code`, `code_number`)
    /// is shared with `other`.
    ///
    /// This is the targeting rule for upserts.
    pub fn shares_key_with(&self, other: &Locality) -> bool {
        self.id == other.id || self.code == other.code || self.code_number == other.code_number
    }

    /// Fill a missing `code_number` with `code`.
    ///
    /// Applied wherever records enter the system (stores, import payloads)
    /// so a record reads the same on every path.
    pub fn normalize(&mut self) {
        if self.code_number.is_empty() {
            self.code_number = self.code.clone();
        }
    }

    /// Owned variant of [`normalize`](Self::normalize)
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}
