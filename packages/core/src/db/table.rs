//! In-Process Locality Table
//!
//! Vec-backed table enforcing the unique keys and the upsert targeting rule.
//! Shared by the memory and JSON-file stores, which wrap it in a lock and
//! decide what happens after a successful mutation.
//!
//! Batch mutations stage their changes on a copy and only commit it when the
//! whole batch succeeds.

use crate::db::{DeleteResult, StoreError, UpsertResult};
use crate::models::{CompiledFilter, Locality};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub(crate) struct LocalityTable {
    records: Vec<Locality>,
}

impl LocalityTable {
    pub fn from_records(records: Vec<Locality>) -> Self {
        Self {
            records: records.into_iter().map(Locality::normalized).collect(),
        }
    }

    pub fn records(&self) -> &[Locality] {
        &self.records
    }

    pub fn find(&self, filter: &CompiledFilter) -> Vec<Locality> {
        self.records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    pub fn find_by_ids(&self, ids: &[i64]) -> Vec<Locality> {
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        self.records
            .iter()
            .filter(|record| wanted.contains(&record.id))
            .cloned()
            .collect()
    }

    pub fn insert_many(&mut self, records: Vec<Locality>) -> Result<Vec<Locality>, StoreError> {
        let records: Vec<Locality> = records.into_iter().map(Locality::normalized).collect();
        let mut staged = self.clone();
        for record in &records {
            staged.check_unique(record, None)?;
            staged.records.push(record.clone());
        }
        *self = staged;
        Ok(records)
    }

    pub fn replace_one(
        &mut self,
        id: i64,
        record: Locality,
    ) -> Result<Option<Locality>, StoreError> {
        let record = record.normalized();
        let Some(position) = self.records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };

        self.check_unique(&record, Some(position))?;
        self.records[position] = record.clone();
        Ok(Some(record))
    }

    pub fn delete_one(&mut self, id: i64) -> bool {
        match self.records.iter().position(|r| r.id == id) {
            Some(position) => {
                self.records.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn delete_many(&mut self, ids: &[i64]) -> DeleteResult {
        let doomed: HashSet<i64> = ids.iter().copied().collect();
        let mut deleted_ids = Vec::new();
        self.records.retain(|r| {
            let keep = !doomed.contains(&r.id);
            if !keep {
                deleted_ids.push(r.id);
            }
            keep
        });
        DeleteResult {
            deleted_count: deleted_ids.len(),
            deleted_ids,
        }
    }

    pub fn upsert_batch(&mut self, records: Vec<Locality>) -> Result<UpsertResult, StoreError> {
        let mut staged = self.clone();
        let mut result = UpsertResult::default();

        for record in records.into_iter().map(Locality::normalized) {
            match staged.records.iter().position(|r| r.shares_key_with(&record)) {
                Some(position) => {
                    result.matched += 1;
                    if staged.records[position] != record {
                        staged.check_unique(&record, Some(position))?;
                        staged.records[position] = record;
                        result.modified += 1;
                    }
                }
                None => {
                    staged.check_unique(&record, None)?;
                    staged.records.push(record);
                    result.inserted += 1;
                }
            }
        }

        *self = staged;
        Ok(result)
    }

    /// Ensure `record` collides with no stored record other than the one at `skip`
    fn check_unique(&self, record: &Locality, skip: Option<usize>) -> Result<(), StoreError> {
        for (position, existing) in self.records.iter().enumerate() {
            if Some(position) == skip {
                continue;
            }
            if existing.id == record.id {
                return Err(StoreError::duplicate_key("Id", record.id));
            }
            if existing.code == record.code {
                return Err(StoreError::duplicate_key("Code", &record.code));
            }
            if existing.code_number == record.code_number {
                return Err(StoreError::duplicate_key("CodeNumber", &record.code_number));
            }
        }
        Ok(())
    }
}
