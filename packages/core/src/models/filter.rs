//! Store Query Filters

use crate::models::{Locality, LocalityType, ValidationError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Filter criteria for listing localities
///
/// All fields are combined with AND logic; `None` fields do not filter.
/// `name_pattern` is a case-insensitive regular expression matched anywhere
/// in the name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalityFilter {
    #[serde(default)]
    pub type_id: Option<LocalityType>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub name_pattern: Option<String>,
}

impl LocalityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, type_id: LocalityType) -> Self {
        self.type_id = Some(type_id);
        self
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.name_pattern = Some(pattern.into());
        self
    }

    /// Compile the filter, validating the name pattern
    pub fn compile(&self) -> Result<CompiledFilter, ValidationError> {
        let name = match self.name_pattern.as_deref() {
            Some(pattern) if !pattern.is_empty() => Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ValidationError::InvalidFilter(e.to_string()))?,
            ),
            _ => None,
        };

        Ok(CompiledFilter {
            type_id: self.type_id,
            parent_id: self.parent_id,
            name,
        })
    }
}

/// A validated [`LocalityFilter`] ready for matching
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    type_id: Option<LocalityType>,
    parent_id: Option<i64>,
    name: Option<Regex>,
}

impl CompiledFilter {
    pub fn matches(&self, locality: &Locality) -> bool {
        if self.type_id.is_some_and(|t| t != locality.type_id) {
            return false;
        }
        if self.parent_id.is_some() && self.parent_id != locality.parent_id {
            return false;
        }
        match &self.name {
            Some(regex) => regex.is_match(&locality.name),
            None => true,
        }
    }
}
