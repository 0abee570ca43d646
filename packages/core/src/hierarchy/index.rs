//! Hierarchy Index
//!
//! Builds an `id → locality` lookup over an immutable snapshot and answers
//! ancestor queries in O(1) amortized time after O(n) construction.
//!
//! # Fail-Soft Resolution
//!
//! A parent reference pointing at an id that is absent from the snapshot is
//! treated as "no ancestor". Callers (the formatter in particular) turn that
//! into a placeholder instead of an error.
//!
//! # Snapshot Ownership
//!
//! The index borrows the snapshot it was built from. After any write the
//! caller reloads a fresh snapshot and builds a new index; there is no hidden
//! shared state to invalidate.

use crate::models::{Locality, LocalityType, ValidationError};
use std::collections::HashMap;
use tracing::debug;

/// Upper bound on parent hops when searching for a Region.
///
/// City → Department → Region is the deepest legal chain. The bound also
/// keeps a malformed cyclic snapshot from looping.
pub const MAX_ANCESTOR_HOPS: usize = 2;

/// Lookup structure over one snapshot of localities
#[derive(Debug)]
pub struct HierarchyIndex<'a> {
    nodes: &'a [Locality],
    by_id: HashMap<i64, &'a Locality>,
}

impl<'a> HierarchyIndex<'a> {
    /// Index a snapshot. When ids repeat, the later record wins.
    pub fn new(nodes: &'a [Locality]) -> Self {
        let by_id = nodes.iter().map(|node| (node.id, node)).collect();
        Self { nodes, by_id }
    }

    pub fn get(&self, id: i64) -> Option<&'a Locality> {
        self.by_id.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Find the Region above `node` by walking parent links.
    ///
    /// Returns `None` when the node has no parent, when a link is dangling,
    /// or when no Region is reached within [`MAX_ANCESTOR_HOPS`].
    pub fn region_ancestor(&self, node: &Locality) -> Option<&'a Locality> {
        let mut current = node;

        for _ in 0..MAX_ANCESTOR_HOPS {
            let parent_id = current.parent_id?;
            let Some(parent) = self.get(parent_id) else {
                debug!(
                    "Dangling parent reference {} while resolving region of {}",
                    parent_id, node.id
                );
                return None;
            };

            if parent.is_region() {
                return Some(parent);
            }
            current = parent;
        }

        None
    }

    /// The immediate parent of `node`, if that parent is a Department.
    ///
    /// Departments are always direct parents of Cities, so no further walk
    /// is attempted.
    pub fn department_ancestor(&self, node: &Locality) -> Option<&'a Locality> {
        let parent_id = node.parent_id?;
        match self.get(parent_id) {
            Some(parent) if parent.is_department() => Some(parent),
            Some(_) => None,
            None => {
                debug!(
                    "Dangling parent reference {} while resolving department of {}",
                    parent_id, node.id
                );
                None
            }
        }
    }

    /// All Regions, in snapshot order
    pub fn regions(&self) -> Vec<&'a Locality> {
        self.of_type(LocalityType::Region, None)
    }

    /// Departments, optionally restricted to one Region
    pub fn departments(&self, region_id: Option<i64>) -> Vec<&'a Locality> {
        self.of_type(LocalityType::Department, region_id)
    }

    /// Cities, optionally restricted to one Department
    pub fn cities(&self, department_id: Option<i64>) -> Vec<&'a Locality> {
        self.of_type(LocalityType::City, department_id)
    }

    /// Parent record of a City
    pub fn department_of_city(&self, city_id: i64) -> Option<&'a Locality> {
        self.parent_of(city_id)
    }

    /// Parent record of a Department
    pub fn region_of_department(&self, department_id: i64) -> Option<&'a Locality> {
        self.parent_of(department_id)
    }

    /// Check that `parent_id` is a legal parent for a new node of `type_id`.
    ///
    /// Regions take no parent; Departments need an existing Region; Cities
    /// need an existing Department.
    pub fn check_parent(
        &self,
        type_id: LocalityType,
        parent_id: Option<i64>,
    ) -> Result<(), ValidationError> {
        match (type_id.expected_parent(), parent_id) {
            (None, None) => Ok(()),
            (None, Some(id)) => Err(ValidationError::InvalidParent(format!(
                "a region cannot have a parent (got {})",
                id
            ))),
            (Some(expected), None) => Err(ValidationError::InvalidParent(format!(
                "a {} requires a {} parent",
                type_id, expected
            ))),
            (Some(expected), Some(id)) => match self.get(id) {
                Some(parent) if parent.type_id == expected => Ok(()),
                Some(parent) => Err(ValidationError::InvalidParent(format!(
                    "parent {} is a {}, expected a {}",
                    id, parent.type_id, expected
                ))),
                None => Err(ValidationError::InvalidParent(format!(
                    "parent {} does not exist",
                    id
                ))),
            },
        }
    }

    fn parent_of(&self, id: i64) -> Option<&'a Locality> {
        let node = self.get(id)?;
        self.get(node.parent_id?)
    }

    fn of_type(&self, type_id: LocalityType, parent_id: Option<i64>) -> Vec<&'a Locality> {
        self.nodes
            .iter()
            .filter(|node| node.type_id == type_id)
            .filter(|node| parent_id.is_none() || node.parent_id == parent_id)
            .collect()
    }
}
