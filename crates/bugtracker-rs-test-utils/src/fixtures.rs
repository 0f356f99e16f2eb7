use bugtracker_rs_protocol::{BugPriority, BugRecord, BugStatus, NewBug};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};

/// Deterministic 24-hex id for the n-th fixture record.
pub fn record_id(n: u32) -> String {
    format!("{n:024x}")
}

/// Minimal valid creation input.
pub fn new_bug(title: &str) -> NewBug {
    NewBug {
        title: title.to_string(),
        description: format!("{title} reproduces every time"),
        status: BugStatus::Open,
        priority: BugPriority::Medium,
        reporter: "alice".to_string(),
        assignee: None,
        tags: Vec::new(),
    }
}

/// Record created `n` minutes after a fixed epoch, so larger `n` is newer.
pub fn bug_record(n: u32, title: &str, status: BugStatus, priority: BugPriority) -> BugRecord {
    let created = base_time() + Duration::minutes(i64::from(n));
    let mut record = BugRecord::new(record_id(n), new_bug(title), created);
    record.status = status;
    record.priority = priority;
    record
}

/// Valid JSON request body.
pub fn bug_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{title} reproduces every time"),
        "reporter": "alice",
    })
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}
