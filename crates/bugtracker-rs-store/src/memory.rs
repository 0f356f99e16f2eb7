//! In-process store backed by a locked map.

use crate::error::StoreError;
use crate::store::{BugPage, BugQuery, BugStore};
use async_trait::async_trait;
use bugtracker_rs_protocol::{BugPatch, BugRecord, NewBug, is_valid_object_id};
use chrono::Utc;
use log::debug;
use mongodb::bson::oid::ObjectId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Store that keeps records in memory; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryBugStore {
    records: RwLock<HashMap<String, BugRecord>>,
}

impl MemoryBugStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-built records as-is, keeping their ids and timestamps.
    pub fn with_records(records: impl IntoIterator<Item = BugRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

fn check_id(id: &str) -> Result<(), StoreError> {
    if is_valid_object_id(id) {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

#[async_trait]
impl BugStore for MemoryBugStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, bug: NewBug) -> Result<BugRecord, StoreError> {
        let record = BugRecord::new(ObjectId::new().to_hex(), bug, Utc::now());
        self.records
            .write()
            .insert(record.id.clone(), record.clone());
        debug!("inserted bug (id={}, backend=memory)", record.id);
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<BugRecord>, StoreError> {
        check_id(id)?;
        Ok(self.records.read().get(id).cloned())
    }

    async fn list(&self, query: &BugQuery) -> Result<BugPage, StoreError> {
        let mut matching: Vec<BugRecord> = self
            .records
            .read()
            .values()
            .filter(|bug| query.matches(bug))
            .cloned()
            .collect();
        // ObjectId hex grows with creation order, so it breaks timestamp ties.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let total = matching.len() as u64;
        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page.limit).unwrap_or(usize::MAX);
        let bugs = matching.into_iter().skip(offset).take(limit).collect();
        Ok(BugPage { bugs, total })
    }

    async fn update(&self, id: &str, patch: &BugPatch) -> Result<Option<BugRecord>, StoreError> {
        check_id(id)?;
        let mut records = self.records.write();
        let Some(record) = records.get_mut(id) else {
            return Ok(None);
        };
        patch.apply(record, Utc::now());
        debug!("updated bug (id={}, backend=memory)", id);
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        check_id(id)?;
        let removed = self.records.write().remove(id).is_some();
        debug!("delete bug (id={}, removed={}, backend=memory)", id, removed);
        Ok(removed)
    }
}
