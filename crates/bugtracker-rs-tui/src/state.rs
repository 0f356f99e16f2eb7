//! Bug list state container and its reducer.
//!
//! All list mutations go through [`reduce`], which also recomputes the
//! filtered `visible` list so rendering never filters on its own.

use bugtracker_rs_protocol::{BugFilter, BugId, BugRecord, filter_bugs};

/// What the list area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Empty,
    /// Load failed; the message is shown with a retry hint.
    Error(String),
    Populated,
}

/// Events that change the bug list.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadStart,
    LoadSuccess(Vec<BugRecord>),
    LoadError(String),
    FilterChanged(BugFilter),
    RecordCreated(BugRecord),
    RecordUpdated(BugRecord),
    RecordDeleted(BugId),
}

/// Full list as loaded from the API plus the active filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerState {
    bugs: Vec<BugRecord>,
    filter: BugFilter,
    loading: bool,
    error: Option<String>,
    visible: Vec<BugRecord>,
}

impl TrackerState {
    pub fn bugs(&self) -> &[BugRecord] {
        &self.bugs
    }

    pub fn filter(&self) -> &BugFilter {
        &self.filter
    }

    /// Records that pass the active filter, newest first.
    pub fn visible(&self) -> &[BugRecord] {
        &self.visible
    }

    pub fn list_state(&self) -> ListState {
        if self.loading {
            ListState::Loading
        } else if let Some(message) = &self.error {
            ListState::Error(message.clone())
        } else if self.visible.is_empty() {
            ListState::Empty
        } else {
            ListState::Populated
        }
    }

    fn refilter(mut self) -> Self {
        self.visible = filter_bugs(&self.bugs, &self.filter);
        self
    }
}

/// Apply one action and return the next state.
pub fn reduce(mut state: TrackerState, action: Action) -> TrackerState {
    match action {
        Action::LoadStart => {
            state.loading = true;
            state.error = None;
            state
        }
        Action::LoadSuccess(bugs) => {
            state.loading = false;
            state.error = None;
            state.bugs = bugs;
            state.refilter()
        }
        Action::LoadError(message) => {
            state.loading = false;
            state.error = Some(message);
            state
        }
        Action::FilterChanged(filter) => {
            state.filter = filter;
            state.refilter()
        }
        Action::RecordCreated(bug) => {
            state.bugs.retain(|existing| existing.id != bug.id);
            state.bugs.insert(0, bug);
            state.refilter()
        }
        Action::RecordUpdated(bug) => {
            match state.bugs.iter_mut().find(|existing| existing.id == bug.id) {
                Some(existing) => *existing = bug,
                None => state.bugs.insert(0, bug),
            }
            state.refilter()
        }
        Action::RecordDeleted(id) => {
            state.bugs.retain(|existing| existing.id != id);
            state.refilter()
        }
    }
}
