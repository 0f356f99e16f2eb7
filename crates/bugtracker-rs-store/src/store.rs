//! Store interface shared by every backend.

use crate::error::StoreError;
use async_trait::async_trait;
use bugtracker_rs_protocol::{BugPatch, BugPriority, BugRecord, BugStatus, NewBug, PageRequest};

/// Criteria for a list request. Results are ordered newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BugQuery {
    pub status: Option<BugStatus>,
    pub priority: Option<BugPriority>,
    pub page: PageRequest,
}

impl BugQuery {
    /// True when `bug` satisfies the equality criteria.
    pub fn matches(&self, bug: &BugRecord) -> bool {
        self.status.is_none_or(|status| bug.status == status)
            && self.priority.is_none_or(|priority| bug.priority == priority)
    }
}

/// One page of a list request plus the total number of matching records.
#[derive(Debug, Clone, PartialEq)]
pub struct BugPage {
    pub bugs: Vec<BugRecord>,
    pub total: u64,
}

#[async_trait]
/// Persistence for bug records.
///
/// Ids are 24-character hex strings assigned on insert. Lookups with a
/// malformed id fail with [`StoreError::InvalidId`]; absent records are
/// reported as `None` / `false`.
pub trait BugStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Persist a new record, assigning its id and both timestamps.
    async fn insert(&self, bug: NewBug) -> Result<BugRecord, StoreError>;

    /// Fetch a record by id.
    async fn get(&self, id: &str) -> Result<Option<BugRecord>, StoreError>;

    /// List one page of matching records, newest first.
    async fn list(&self, query: &BugQuery) -> Result<BugPage, StoreError>;

    /// Apply a patch and refresh `updatedAt`; returns the updated record.
    async fn update(&self, id: &str, patch: &BugPatch) -> Result<Option<BugRecord>, StoreError>;

    /// Remove a record; returns whether it existed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}
