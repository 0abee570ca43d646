//! Display Formatting
//!
//! Projects every locality of a snapshot onto a [`FormattedLocality`] row
//! carrying resolved Region, Department and City names, regardless of the
//! locality's own level.

use crate::hierarchy::HierarchyIndex;
use crate::models::{FormattedLocality, Locality, LocalityType, PLACEHOLDER};

/// Format a whole snapshot into display rows.
///
/// Rows are stable-sorted by `(type_id, code)`: Regions first, then
/// Departments, then Cities, each ordered by code. This default order is
/// independent of any sort a caller applies afterwards.
pub fn format_localities(snapshot: &[Locality]) -> Vec<FormattedLocality> {
    let index = HierarchyIndex::new(snapshot);

    let mut rows: Vec<FormattedLocality> = snapshot
        .iter()
        .map(|locality| format_locality(&index, locality))
        .collect();

    rows.sort_by(|a, b| {
        a.type_id
            .cmp(&b.type_id)
            .then_with(|| a.code.cmp(&b.code))
    });
    rows
}

/// Format one locality against an index of its snapshot
pub fn format_locality(index: &HierarchyIndex<'_>, locality: &Locality) -> FormattedLocality {
    let name_or_placeholder =
        |found: Option<&Locality>| found.map_or_else(|| PLACEHOLDER.to_string(), |l| l.name.clone());

    let (region, department, city) = match locality.type_id {
        LocalityType::Region => (
            locality.name.clone(),
            PLACEHOLDER.to_string(),
            PLACEHOLDER.to_string(),
        ),
        LocalityType::Department => (
            name_or_placeholder(index.region_ancestor(locality)),
            locality.name.clone(),
            PLACEHOLDER.to_string(),
        ),
        // The region is found by walking from the city itself, not from the
        // resolved department.
        LocalityType::City => (
            name_or_placeholder(index.region_ancestor(locality)),
            name_or_placeholder(index.department_ancestor(locality)),
            locality.name.clone(),
        ),
    };

    FormattedLocality {
        id: locality.id,
        code: locality.code.clone(),
        type_id: locality.type_id,
        region,
        department,
        city,
    }
}

/// Free-text search over display rows.
///
/// Names match case-insensitively; codes match as a plain substring.
/// An empty query keeps every row.
pub fn search_rows<'r>(rows: &'r [FormattedLocality], query: &str) -> Vec<&'r FormattedLocality> {
    if query.is_empty() {
        return rows.iter().collect();
    }

    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| {
            row.city.to_lowercase().contains(&needle)
                || row.department.to_lowercase().contains(&needle)
                || row.region.to_lowercase().contains(&needle)
                || row.code.contains(query)
        })
        .collect()
}
