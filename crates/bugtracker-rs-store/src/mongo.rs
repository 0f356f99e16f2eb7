//! MongoDB-backed store.

use crate::error::StoreError;
use crate::store::{BugPage, BugQuery, BugStore};
use async_trait::async_trait;
use bugtracker_rs_config::StoreConfig;
use bugtracker_rs_protocol::{BugPatch, BugPriority, BugRecord, BugStatus, NewBug};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use log::{debug, info};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document, doc};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

/// Stored shape of a bug record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BugDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    description: String,
    status: BugStatus,
    priority: BugPriority,
    reporter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assignee: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl BugDocument {
    fn into_record(self) -> Result<BugRecord, StoreError> {
        Ok(BugRecord {
            id: self.id.to_hex(),
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            reporter: self.reporter,
            assignee: self.assignee,
            tags: self.tags,
            created_at: from_bson_time(self.created_at)?,
            updated_at: from_bson_time(self.updated_at)?,
        })
    }
}

fn to_bson_time(time: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(time.timestamp_millis())
}

fn from_bson_time(time: bson::DateTime) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(time.timestamp_millis()).ok_or_else(|| {
        StoreError::Serialization(format!("timestamp out of range: {}", time.timestamp_millis()))
    })
}

fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

/// Equality filter document for a list query.
fn query_filter(query: &BugQuery) -> Document {
    let mut filter = Document::new();
    if let Some(status) = query.status {
        filter.insert("status", status.as_str());
    }
    if let Some(priority) = query.priority {
        filter.insert("priority", priority.as_str());
    }
    filter
}

/// `$set` / `$unset` update document for a patch. `updatedAt` is always set.
fn update_document(patch: &BugPatch, now: DateTime<Utc>) -> Document {
    let mut set = Document::new();
    let mut unset = Document::new();
    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(description) = &patch.description {
        set.insert("description", description.as_str());
    }
    if let Some(status) = patch.status {
        set.insert("status", status.as_str());
    }
    if let Some(priority) = patch.priority {
        set.insert("priority", priority.as_str());
    }
    if let Some(reporter) = &patch.reporter {
        set.insert("reporter", reporter.as_str());
    }
    match &patch.assignee {
        Some(Some(assignee)) => {
            set.insert("assignee", assignee.as_str());
        }
        Some(None) => {
            unset.insert("assignee", "");
        }
        None => {}
    }
    if let Some(tags) = &patch.tags {
        let tags: Vec<Bson> = tags.iter().map(|tag| Bson::from(tag.as_str())).collect();
        set.insert("tags", tags);
    }
    set.insert("updatedAt", to_bson_time(now));

    let mut update = doc! { "$set": set };
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

/// Store backed by a single MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoBugStore {
    client: Client,
    database: String,
    bugs: Collection<BugDocument>,
}

impl MongoBugStore {
    /// Connect using the configured URI, database and collection.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&config.uri).await?;
        let bugs = client
            .database(&config.database)
            .collection::<BugDocument>(&config.collection);
        info!(
            "connected to mongodb (database={}, collection={})",
            config.database, config.collection
        );
        Ok(Self {
            client,
            database: config.database.clone(),
            bugs,
        })
    }
}

#[async_trait]
impl BugStore for MongoBugStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        debug!("mongodb ping ok (database={})", self.database);
        Ok(())
    }

    async fn insert(&self, bug: NewBug) -> Result<BugRecord, StoreError> {
        let now = to_bson_time(Utc::now());
        let document = BugDocument {
            id: ObjectId::new(),
            title: bug.title,
            description: bug.description,
            status: bug.status,
            priority: bug.priority,
            reporter: bug.reporter,
            assignee: bug.assignee,
            tags: bug.tags,
            created_at: now,
            updated_at: now,
        };
        self.bugs.insert_one(&document).await?;
        debug!("inserted bug (id={}, backend=mongodb)", document.id);
        document.into_record()
    }

    async fn get(&self, id: &str) -> Result<Option<BugRecord>, StoreError> {
        let oid = parse_id(id)?;
        self.bugs
            .find_one(doc! { "_id": oid })
            .await?
            .map(BugDocument::into_record)
            .transpose()
    }

    async fn list(&self, query: &BugQuery) -> Result<BugPage, StoreError> {
        let filter = query_filter(query);
        let limit = i64::try_from(query.page.limit).unwrap_or(i64::MAX);
        let documents: Vec<BugDocument> = self
            .bugs
            .find(filter.clone())
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .skip(query.page.offset())
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        let total = self.bugs.count_documents(filter).await?;
        let bugs = documents
            .into_iter()
            .map(BugDocument::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "listed bugs (returned={}, total={}, backend=mongodb)",
            bugs.len(),
            total
        );
        Ok(BugPage { bugs, total })
    }

    async fn update(&self, id: &str, patch: &BugPatch) -> Result<Option<BugRecord>, StoreError> {
        let oid = parse_id(id)?;
        let updated = self
            .bugs
            .find_one_and_update(doc! { "_id": oid }, update_document(patch, Utc::now()))
            .return_document(ReturnDocument::After)
            .await?;
        debug!(
            "update bug (id={}, found={}, backend=mongodb)",
            id,
            updated.is_some()
        );
        updated.map(BugDocument::into_record).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let oid = parse_id(id)?;
        let result = self.bugs.delete_one(doc! { "_id": oid }).await?;
        debug!(
            "delete bug (id={}, removed={}, backend=mongodb)",
            id,
            result.deleted_count > 0
        );
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugtracker_rs_protocol::PageRequest;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_filter_uses_wire_names() {
        let query = BugQuery {
            status: Some(BugStatus::InProgress),
            priority: Some(BugPriority::Critical),
            page: PageRequest::default(),
        };
        assert_eq!(
            query_filter(&query),
            doc! { "status": "in-progress", "priority": "critical" }
        );
        assert!(query_filter(&BugQuery::default()).is_empty());
    }

    #[test]
    fn status_patch_sets_status_and_timestamp() {
        let now = Utc::now();
        let update = update_document(&BugPatch::status(BugStatus::Resolved), now);
        assert_eq!(
            update,
            doc! { "$set": { "status": "resolved", "updatedAt": to_bson_time(now) } }
        );
    }

    #[test]
    fn cleared_assignee_is_unset() {
        let patch = BugPatch {
            assignee: Some(None),
            tags: Some(vec!["ui".to_string()]),
            ..BugPatch::default()
        };
        let update = update_document(&patch, Utc::now());
        assert_eq!(update.get_document("$unset").ok(), Some(&doc! { "assignee": "" }));
        let set = update.get_document("$set").expect("set");
        assert_eq!(set.get_array("tags").ok(), Some(&vec![Bson::from("ui")]));
        assert!(!set.contains_key("assignee"));
    }

    #[test]
    fn document_converts_to_record() {
        let oid = ObjectId::new();
        let now = Utc::now();
        let record = BugDocument {
            id: oid,
            title: "Crash".to_string(),
            description: "On save".to_string(),
            status: BugStatus::Open,
            priority: BugPriority::High,
            reporter: "dana".to_string(),
            assignee: None,
            tags: Vec::new(),
            created_at: to_bson_time(now),
            updated_at: to_bson_time(now),
        }
        .into_record()
        .expect("record");
        assert_eq!(record.id, oid.to_hex());
        assert_eq!(record.created_at.timestamp_millis(), now.timestamp_millis());
        assert_eq!(record.created_at, record.updated_at);
    }
}
