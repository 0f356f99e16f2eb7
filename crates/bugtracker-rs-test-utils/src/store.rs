use async_trait::async_trait;
use bugtracker_rs_protocol::{BugPatch, BugRecord, NewBug};
use bugtracker_rs_store::{BugPage, BugQuery, BugStore, MemoryBugStore, StoreError};
use parking_lot::Mutex;

/// Store whose every operation fails, for exercising 500 paths.
#[derive(Debug, Clone, Default)]
pub struct FailingStore;

fn failure() -> StoreError {
    StoreError::Serialization("simulated store failure".to_string())
}

#[async_trait]
impl BugStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(failure())
    }

    async fn insert(&self, _bug: NewBug) -> Result<BugRecord, StoreError> {
        Err(failure())
    }

    async fn get(&self, _id: &str) -> Result<Option<BugRecord>, StoreError> {
        Err(failure())
    }

    async fn list(&self, _query: &BugQuery) -> Result<BugPage, StoreError> {
        Err(failure())
    }

    async fn update(&self, _id: &str, _patch: &BugPatch) -> Result<Option<BugRecord>, StoreError> {
        Err(failure())
    }

    async fn delete(&self, _id: &str) -> Result<bool, StoreError> {
        Err(failure())
    }
}

/// In-memory store that remembers the queries and patches it received.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryBugStore,
    queries: Mutex<Vec<BugQuery>>,
    patches: Mutex<Vec<(String, BugPatch)>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = BugRecord>) -> Self {
        Self {
            inner: MemoryBugStore::with_records(records),
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<BugQuery> {
        self.queries.lock().clone()
    }

    pub fn patches(&self) -> Vec<(String, BugPatch)> {
        self.patches.lock().clone()
    }
}

#[async_trait]
impl BugStore for RecordingStore {
    fn backend(&self) -> &'static str {
        "recording"
    }

    async fn insert(&self, bug: NewBug) -> Result<BugRecord, StoreError> {
        self.inner.insert(bug).await
    }

    async fn get(&self, id: &str) -> Result<Option<BugRecord>, StoreError> {
        self.inner.get(id).await
    }

    async fn list(&self, query: &BugQuery) -> Result<BugPage, StoreError> {
        self.queries.lock().push(*query);
        self.inner.list(query).await
    }

    async fn update(&self, id: &str, patch: &BugPatch) -> Result<Option<BugRecord>, StoreError> {
        self.patches.lock().push((id.to_string(), patch.clone()));
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete(id).await
    }
}
