//! Partition of an incoming batch against the current snapshot.

use crate::models::Locality;
use std::collections::HashMap;

/// An incoming record that collides with a stored one
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub incoming: Locality,
    pub existing: Locality,
}

/// Result of reconciling an import batch
///
/// Every incoming record lands in exactly one bucket, and each bucket keeps
/// the order of the incoming batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    /// Incoming records matching a stored node that differs from them
    pub conflicts: Vec<Conflict>,

    /// Incoming records matching nothing
    pub pure_new: Vec<Locality>,

    /// Incoming records identical to the stored node they match.
    /// They need no decision and are never written.
    pub unchanged: Vec<Locality>,
}

impl ImportPlan {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Number of incoming records the plan was built from
    pub fn incoming_len(&self) -> usize {
        self.conflicts.len() + self.pure_new.len() + self.unchanged.len()
    }

    /// Batch written when every conflicting record is accepted
    pub fn accept_all(&self) -> Vec<Locality> {
        self.pure_new
            .iter()
            .cloned()
            .chain(self.conflicts.iter().map(|c| c.incoming.clone()))
            .collect()
    }
}

/// Partition `incoming` against `existing`.
///
/// An incoming record conflicts when it shares its `id` or its `code` with a
/// stored node; the first such node in snapshot order is reported. Matching
/// deliberately ignores `code_number`, so a record can land in `pure_new`
/// and still be folded into a stored node by the upsert.
pub fn reconcile(incoming: Vec<Locality>, existing: &[Locality]) -> ImportPlan {
    let mut first_by_id: HashMap<i64, usize> = HashMap::new();
    let mut first_by_code: HashMap<&str, usize> = HashMap::new();
    for (position, node) in existing.iter().enumerate() {
        first_by_id.entry(node.id).or_insert(position);
        first_by_code.entry(node.code.as_str()).or_insert(position);
    }

    let mut plan = ImportPlan::default();
    for record in incoming {
        let by_id = first_by_id.get(&record.id).copied();
        let by_code = first_by_code.get(record.code.as_str()).copied();

        let matched = match (by_id, by_code) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        match matched.map(|position| &existing[position]) {
            Some(node) if *node == record => plan.unchanged.push(record),
            Some(node) => plan.conflicts.push(Conflict {
                incoming: record,
                existing: node.clone(),
            }),
            None => plan.pure_new.push(record),
        }
    }

    plan
}
