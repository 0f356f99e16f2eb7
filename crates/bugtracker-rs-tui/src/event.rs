//! TUI event types for input and API results.

use bugtracker_rs_protocol::{BugId, BugRecord};
use crossterm::event::KeyEvent;

/// Application event emitted by the input handler or a finished request.
#[derive(Debug)]
pub enum AppEvent {
    /// Keyboard input event.
    Input(KeyEvent),
    /// Result of loading the full bug list.
    Loaded(Result<Vec<BugRecord>, String>),
    /// A bug was created.
    Created(BugRecord),
    /// A bug was updated.
    Updated(BugRecord),
    /// A bug was deleted.
    Deleted(BugId),
    /// Error from a create/update/delete request.
    ActionError(String),
}
