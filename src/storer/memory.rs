use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{AppliedPatch, Storer};
use crate::error::BackendError;

/// Storer keeping its records in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorer {
    records: Mutex<Vec<AppliedPatch>>,
}

impl MemoryStorer {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, Vec<AppliedPatch>>, BackendError> {
        self.records
            .lock()
            .map_err(|_| BackendError::Other("memory storer lock poisoned".to_string()))
    }
}

fn max_batch(records: &[AppliedPatch]) -> Option<i64> {
    records.iter().map(|r| r.batch).max()
}

#[async_trait]
impl Storer for MemoryStorer {
    async fn init(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn delta(&self, candidates: &[String]) -> Result<Vec<String>, BackendError> {
        let records = self.records()?;
        let applied: HashSet<&str> = records.iter().map(|r| r.patch.as_str()).collect();
        Ok(candidates
            .iter()
            .filter(|name| !applied.contains(name.as_str()))
            .cloned()
            .collect())
    }

    async fn last_batch(&self) -> Result<Vec<String>, BackendError> {
        let records = self.records()?;
        let Some(max) = max_batch(&records) else {
            return Ok(Vec::new());
        };
        Ok(records
            .iter()
            .filter(|r| r.batch == max)
            .map(|r| r.patch.clone())
            .collect())
    }

    async fn insert_batch(&self, names: &[String]) -> Result<(), BackendError> {
        if names.is_empty() {
            return Ok(());
        }
        let mut records = self.records()?;
        let batch = max_batch(&records).unwrap_or(0) + 1;
        records.extend(names.iter().map(|name| AppliedPatch {
            patch: name.clone(),
            batch,
        }));
        Ok(())
    }

    async fn delete_last_batch(&self) -> Result<(), BackendError> {
        let mut records = self.records()?;
        if let Some(max) = max_batch(&records) {
            records.retain(|r| r.batch != max);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AppliedPatch>, BackendError> {
        let mut records = self.records()?.clone();
        records.sort_by(|a, b| a.batch.cmp(&b.batch).then_with(|| a.patch.cmp(&b.patch)));
        Ok(records)
    }
}
