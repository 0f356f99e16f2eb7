//! Test helpers shared across bug tracker crates.

pub mod fixtures;
pub mod store;

pub use fixtures::{bug_body, bug_record, new_bug, record_id};
pub use store::{FailingStore, RecordingStore};
