//! In-process store, used by tests and dry runs

use crate::error::{RelayError, RelayResult};
use crate::record::{RecordPatch, TweetRecord};
use crate::store::{DocumentStore, Filter};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<BTreeMap<i64, TweetRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<i64, TweetRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_one(&self, id: i64) -> RelayResult<Option<TweetRecord>> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn find(&self, filter: &Filter) -> RelayResult<Vec<TweetRecord>> {
        // BTreeMap iterates in key order
        Ok(self
            .lock()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn insert(&self, record: &TweetRecord) -> RelayResult<()> {
        record.validate()?;
        let mut records = self.lock();
        if records.contains_key(&record.id) {
            return Err(RelayError::Store(format!(
                "duplicate key: record {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn update(&self, id: i64, patch: &RecordPatch) -> RelayResult<()> {
        let mut records = self.lock();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| RelayError::Store(format!("record {} not found", id)))?;
        record.apply(patch)
    }
}
