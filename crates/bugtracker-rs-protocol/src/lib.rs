//! Wire protocol types for the bug tracker, plus the pure rules applied to
//! bug payloads before they reach the record store.
//!
//! Everything in this crate is synchronous and side-effect free: the server
//! runs [`sanitize_bug`] then [`validate_bug`] on incoming bodies, and the
//! frontend narrows its in-memory list with [`filter_bugs`].

mod api;
mod bug;
mod filter;
mod id;
mod sanitize;
mod validate;

pub use api::{
    BugListResponse, DEFAULT_LIMIT, DEFAULT_PAGE, ErrorBody, HealthResponse, ListQuery, MAX_LIMIT,
    MAX_OFFSET, MessageBody, PageRequest, Pagination,
};
pub use bug::{BugId, BugPatch, BugPriority, BugRecord, BugStatus, NewBug};
pub use filter::{BugFilter, filter_bugs};
pub use id::is_valid_object_id;
pub use sanitize::sanitize_bug;
pub use validate::{BugField, FieldError, ValidationReport, validate_bug};

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
