//! Bug record model and the typed payloads derived from request bodies.

use crate::validate::{BugField, FieldError, is_falsy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier assigned by the record store (24 hex characters).
pub type BugId = String;

/// Workflow state of a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BugStatus {
    /// Newly reported.
    #[default]
    Open,
    /// Someone is working on it.
    InProgress,
    /// Fixed, awaiting confirmation.
    Resolved,
    /// Done.
    Closed,
}

impl BugStatus {
    /// All statuses in workflow order.
    pub const ALL: [BugStatus; 4] = [
        BugStatus::Open,
        BugStatus::InProgress,
        BugStatus::Resolved,
        BugStatus::Closed,
    ];
    /// Wire names accepted by the validator, in workflow order.
    pub const NAMES: &'static [&'static str] = &["open", "in-progress", "resolved", "closed"];

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            BugStatus::Open => "open",
            BugStatus::InProgress => "in-progress",
            BugStatus::Resolved => "resolved",
            BugStatus::Closed => "closed",
        }
    }

    /// Parse a wire name; `None` for anything outside the enumeration.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    /// Next status in workflow order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for BugStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BugPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl BugPriority {
    /// All priorities from least to most urgent.
    pub const ALL: [BugPriority; 4] = [
        BugPriority::Low,
        BugPriority::Medium,
        BugPriority::High,
        BugPriority::Critical,
    ];
    /// Wire names accepted by the validator.
    pub const NAMES: &'static [&'static str] = &["low", "medium", "high", "critical"];

    /// Wire name of the priority.
    pub fn as_str(self) -> &'static str {
        match self {
            BugPriority::Low => "low",
            BugPriority::Medium => "medium",
            BugPriority::High => "high",
            BugPriority::Critical => "critical",
        }
    }

    /// Parse a wire name; `None` for anything outside the enumeration.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|priority| priority.as_str() == value)
    }

    /// Next priority, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for BugPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted bug report as exchanged over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugRecord {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: BugId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: BugStatus,
    #[serde(default)]
    pub priority: BugPriority,
    pub reporter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl BugRecord {
    /// Build a record from creation input; both timestamps are set to `now`.
    pub fn new(id: BugId, bug: NewBug, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: bug.title,
            description: bug.description,
            status: bug.status,
            priority: bug.priority,
            reporter: bug.reporter,
            assignee: bug.assignee,
            tags: bug.tags,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Typed creation input built from a sanitized, validated body.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBug {
    pub title: String,
    pub description: String,
    pub status: BugStatus,
    pub priority: BugPriority,
    pub reporter: String,
    pub assignee: Option<String>,
    pub tags: Vec<String>,
}

impl NewBug {
    /// Convert a request body into creation input, applying defaults for
    /// status and priority. Unknown keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self, FieldError> {
        let empty = Map::new();
        let map = value.as_object().unwrap_or(&empty);
        let status = match map.get(BugField::Status.key()) {
            Some(value) => parse_status(value)?,
            None => BugStatus::default(),
        };
        let priority = match priority_value(map) {
            Some(value) => parse_priority(value)?,
            None => BugPriority::default(),
        };
        Ok(Self {
            title: required_text(map, BugField::Title)?,
            description: required_text(map, BugField::Description)?,
            status,
            priority,
            reporter: required_text(map, BugField::Reporter)?,
            assignee: match map.get(BugField::Assignee.key()) {
                Some(value) => optional_text(value, BugField::Assignee)?,
                None => None,
            },
            tags: match map.get(BugField::Tags.key()) {
                Some(value) => tag_list(value)?,
                None => Vec::new(),
            },
        })
    }
}

/// Partial update built from a sanitized request body.
///
/// `assignee` is doubly optional: `Some(None)` clears the assignee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BugPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<BugStatus>,
    pub priority: Option<BugPriority>,
    pub reporter: Option<String>,
    pub assignee: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl BugPatch {
    /// Convert an update body into a patch. Identity and timestamp keys
    /// (`_id`, `createdAt`, `updatedAt`) and unknown keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self, FieldError> {
        let Some(map) = value.as_object() else {
            return Ok(Self::default());
        };
        let mut patch = Self::default();
        for field in [BugField::Title, BugField::Description, BugField::Reporter] {
            if map.contains_key(field.key()) {
                let text = required_text(map, field)?;
                match field {
                    BugField::Title => patch.title = Some(text),
                    BugField::Description => patch.description = Some(text),
                    _ => patch.reporter = Some(text),
                }
            }
        }
        if let Some(value) = map.get(BugField::Status.key()) {
            patch.status = Some(parse_status(value)?);
        }
        if let Some(value) = priority_value(map) {
            patch.priority = Some(parse_priority(value)?);
        }
        if let Some(value) = map.get(BugField::Assignee.key()) {
            patch.assignee = Some(optional_text(value, BugField::Assignee)?);
        }
        if let Some(value) = map.get(BugField::Tags.key()) {
            patch.tags = Some(tag_list(value)?);
        }
        Ok(patch)
    }

    /// Patch that only moves a bug to a new status.
    pub fn status(status: BugStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// True when the patch changes no field.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch to a record and refresh `updated_at`.
    pub fn apply(&self, record: &mut BugRecord, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            record.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            record.description.clone_from(description);
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(priority) = self.priority {
            record.priority = priority;
        }
        if let Some(reporter) = &self.reporter {
            record.reporter.clone_from(reporter);
        }
        if let Some(assignee) = &self.assignee {
            record.assignee.clone_from(assignee);
        }
        if let Some(tags) = &self.tags {
            record.tags.clone_from(tags);
        }
        record.updated_at = now.max(record.created_at);
    }
}

fn required_text(map: &Map<String, Value>, field: BugField) -> Result<String, FieldError> {
    map.get(field.key())
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(FieldError::Missing(field))
}

/// Priority value unless absent or falsy.
fn priority_value(map: &Map<String, Value>) -> Option<&Value> {
    map.get(BugField::Priority.key())
        .filter(|value| !is_falsy(value))
}

fn parse_status(value: &Value) -> Result<BugStatus, FieldError> {
    value
        .as_str()
        .and_then(BugStatus::parse)
        .ok_or(FieldError::NotOneOf {
            field: BugField::Status,
            allowed: BugStatus::NAMES,
        })
}

fn parse_priority(value: &Value) -> Result<BugPriority, FieldError> {
    value
        .as_str()
        .and_then(BugPriority::parse)
        .ok_or(FieldError::NotOneOf {
            field: BugField::Priority,
            allowed: BugPriority::NAMES,
        })
}

/// Null and empty text both mean "unset".
fn optional_text(value: &Value, field: BugField) -> Result<Option<String>, FieldError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) if text.is_empty() => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        _ => Err(FieldError::NotText(field)),
    }
}

/// Null means "no tags".
fn tag_list(value: &Value) -> Result<Vec<String>, FieldError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        _ => return Err(FieldError::NotList(BugField::Tags)),
    };
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or(FieldError::TagNotText(idx))
        })
        .collect()
}
