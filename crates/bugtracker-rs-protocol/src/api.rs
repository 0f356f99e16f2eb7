//! Request and response bodies of the REST API.

use crate::bug::BugRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page number for list requests.
pub const DEFAULT_PAGE: u64 = 1;
/// Default page size for list requests.
pub const DEFAULT_LIMIT: u64 = 10;
/// Largest page size honored by the server.
pub const MAX_LIMIT: u64 = 100;
/// Largest skip count; document stores encode it as a signed 64-bit integer.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Raw query string of `GET /bugs`.
///
/// Numbers are kept as text so malformed values fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

impl ListQuery {
    /// Status criterion, if non-empty.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|value| !value.is_empty())
    }

    /// Priority criterion, if non-empty.
    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref().filter(|value| !value.is_empty())
    }

    /// Resolved page window with defaults and the size cap applied.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE),
            parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_LIMIT),
        )
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}

/// One-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Build a window, clamping to `page >= 1` and `1 <= limit <= MAX_LIMIT`.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Number of records to skip, capped at [`MAX_OFFSET`].
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(MAX_OFFSET)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// Pagination metadata returned with a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(request.limit),
        }
    }
}

/// Body of `GET /bugs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugListResponse {
    pub bugs: Vec<BugRecord>,
    pub pagination: Pagination,
}

/// Error body shared by every failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Itemized validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    /// Internal detail, only exposed in development mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            message: None,
        }
    }

    /// Top-level message with validation details appended, for display.
    pub fn summary(&self) -> String {
        match &self.details {
            Some(details) if !details.is_empty() => {
                format!("{}: {}", self.error, details.join("; "))
            }
            _ => self.error.clone(),
        }
    }
}

/// Plain `{ message }` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started.
    pub uptime: f64,
}
