//! Display Rows
//!
//! `FormattedLocality` is the flattened, display-ready projection of a
//! locality with its Region, Department and City names resolved. Rows are
//! derived from a snapshot on demand and never persisted.

use crate::models::LocalityType;
use serde::{Deserialize, Serialize};

/// Placeholder shown when a hierarchy level does not apply or cannot be resolved
pub const PLACEHOLDER: &str = "--";

/// A locality projected onto the three hierarchy columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedLocality {
    #[serde(rename = "Id")]
    pub id: i64,

    #[serde(rename = "Code")]
    pub code: String,

    #[serde(rename = "typeId")]
    pub type_id: LocalityType,

    #[serde(rename = "Region")]
    pub region: String,

    #[serde(rename = "Department")]
    pub department: String,

    #[serde(rename = "City")]
    pub city: String,
}

impl FormattedLocality {
    /// Number of hierarchy columns holding a resolved name
    pub fn resolved_columns(&self) -> usize {
        [&self.region, &self.department, &self.city]
            .iter()
            .filter(|name| name.as_str() != PLACEHOLDER)
            .count()
    }
}

/// Per-level counts over a set of rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalityStats {
    pub regions: usize,
    pub departments: usize,
    pub cities: usize,
}

impl LocalityStats {
    pub fn from_rows(rows: &[FormattedLocality]) -> Self {
        rows.iter().fold(Self::default(), |mut stats, row| {
            match row.type_id {
                LocalityType::Region => stats.regions += 1,
                LocalityType::Department => stats.departments += 1,
                LocalityType::City => stats.cities += 1,
            }
            stats
        })
    }

    pub fn total(&self) -> usize {
        self.regions + self.departments + self.cities
    }
}
