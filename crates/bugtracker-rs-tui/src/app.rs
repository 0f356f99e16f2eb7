//! Application state for the bug tracker TUI.

use crate::event::AppEvent;
use crate::form::{BugForm, FormMode};
use crate::state::{Action, TrackerState, reduce};
use bugtracker_rs_protocol::{BugFilter, BugId, BugPriority, BugRecord, BugStatus};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info};
use serde_json::Value;

/// Which view has keyboard focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    List,
    Form(BugForm),
    ConfirmDelete { id: BugId, title: String },
}

/// Request the event loop should run against the API.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Reload,
    Create(Value),
    Update(BugId, Value),
    SetStatus(BugId, BugStatus),
    Delete(BugId),
    Quit,
}

/// Top-level application state for the TUI.
#[derive(Debug)]
pub struct App {
    pub tracker: TrackerState,
    pub screen: Screen,
    /// Index into the visible list.
    pub selected: usize,
    /// Whether typed characters go to the search box.
    pub searching: bool,
    /// Status line text.
    pub status: String,
    /// API location shown in the header.
    pub base_url: String,
}

impl App {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            tracker: TrackerState::default(),
            screen: Screen::List,
            selected: 0,
            searching: false,
            status: "idle".to_string(),
            base_url: base_url.into(),
        }
    }

    /// Run an action through the reducer and keep the selection in range.
    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.tracker);
        self.tracker = reduce(state, action);
        let visible = self.tracker.visible().len();
        if self.selected >= visible {
            self.selected = visible.saturating_sub(1);
        }
    }

    pub fn selected_bug(&self) -> Option<&BugRecord> {
        self.tracker.visible().get(self.selected)
    }

    pub fn push_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Start a (re)load of the list.
    pub fn reload(&mut self) -> Option<Command> {
        self.dispatch(Action::LoadStart);
        self.push_status("loading");
        Some(Command::Reload)
    }

    /// Apply an event and return the request it triggers, if any.
    pub fn handle_event(&mut self, event: AppEvent) -> Option<Command> {
        match event {
            AppEvent::Input(key) => self.handle_key(key),
            AppEvent::Loaded(Ok(bugs)) => {
                info!("bug list loaded (count={})", bugs.len());
                self.push_status(format!("loaded {} bugs", bugs.len()));
                self.dispatch(Action::LoadSuccess(bugs));
                None
            }
            AppEvent::Loaded(Err(message)) => {
                self.push_status("load failed");
                self.dispatch(Action::LoadError(message));
                None
            }
            AppEvent::Created(bug) => {
                self.push_status(format!("created \"{}\"", bug.title));
                self.close_form();
                self.dispatch(Action::RecordCreated(bug));
                self.selected = 0;
                None
            }
            AppEvent::Updated(bug) => {
                self.push_status(format!("updated \"{}\" ({})", bug.title, bug.status));
                self.close_form();
                self.dispatch(Action::RecordUpdated(bug));
                None
            }
            AppEvent::Deleted(id) => {
                self.push_status("bug deleted");
                self.dispatch(Action::RecordDeleted(id));
                None
            }
            AppEvent::ActionError(message) => {
                match &mut self.screen {
                    Screen::Form(form) => form.error = Some(message),
                    _ => self.push_status(message),
                }
                None
            }
        }
    }

    fn close_form(&mut self) {
        if matches!(self.screen, Screen::Form(_)) {
            self.screen = Screen::List;
        }
    }

    /// Handle keyboard input for the active screen.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }
        match &self.screen {
            Screen::List if self.searching => self.handle_search_key(key),
            Screen::List => self.handle_list_key(key),
            Screen::Form(_) => self.handle_form_key(key),
            Screen::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(Command::Quit),
            KeyCode::Char('r') => return self.reload(),
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.tracker.visible().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.tracker.visible().len().saturating_sub(1),
            KeyCode::Char('n') => self.screen = Screen::Form(BugForm::create()),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(bug) = self.selected_bug() {
                    self.screen = Screen::Form(BugForm::edit(bug));
                }
            }
            KeyCode::Char('d') => {
                if let Some(bug) = self.selected_bug() {
                    self.screen = Screen::ConfirmDelete {
                        id: bug.id.clone(),
                        title: bug.title.clone(),
                    };
                }
            }
            KeyCode::Char('x') => {
                let bug = self.selected_bug()?;
                let command = Command::SetStatus(bug.id.clone(), bug.status.next());
                self.push_status("saving");
                return Some(command);
            }
            KeyCode::Char('s') => {
                let mut filter = self.tracker.filter().clone();
                filter.status = cycle_option(filter.status, &BugStatus::ALL);
                self.dispatch(Action::FilterChanged(filter));
            }
            KeyCode::Char('p') => {
                let mut filter = self.tracker.filter().clone();
                filter.priority = cycle_option(filter.priority, &BugPriority::ALL);
                self.dispatch(Action::FilterChanged(filter));
            }
            KeyCode::Char('c') => self.dispatch(Action::FilterChanged(BugFilter::default())),
            KeyCode::Char('/') => self.searching = true,
            _ => {}
        }
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Command> {
        let mut filter = self.tracker.filter().clone();
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.searching = false;
                return None;
            }
            KeyCode::Backspace => {
                filter.search.pop();
            }
            KeyCode::Char(ch) => filter.search.push(ch),
            _ => return None,
        }
        debug!("search changed (len={})", filter.search.len());
        self.dispatch(Action::FilterChanged(filter));
        None
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Command> {
        let Screen::Form(form) = &mut self.screen else {
            return None;
        };
        match key.code {
            KeyCode::Esc => {
                self.screen = Screen::List;
                return None;
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left | KeyCode::Right => form.cycle_choice(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => form.insert_char(ch),
            KeyCode::Enter => match form.checked_body() {
                Ok(body) => {
                    form.error = None;
                    let command = match &form.mode {
                        FormMode::Create => Command::Create(body),
                        FormMode::Edit(id) => Command::Update(id.clone(), body),
                    };
                    self.push_status("saving");
                    return Some(command);
                }
                Err(message) => form.error = Some(message),
            },
            _ => {}
        }
        None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<Command> {
        let Screen::ConfirmDelete { id, .. } = &self.screen else {
            return None;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let command = Command::Delete(id.clone());
                self.screen = Screen::List;
                self.push_status("deleting");
                Some(command)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.screen = Screen::List;
                None
            }
            _ => None,
        }
    }
}

/// None -> first -> ... -> last -> None.
fn cycle_option<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => {
            let idx = all.iter().position(|item| *item == value)?;
            all.get(idx + 1).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormField;
    use crate::state::ListState;
    use bugtracker_rs_test_utils::{bug_record, record_id};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded_app() -> App {
        let mut app = App::new("http://localhost/api");
        app.handle_event(AppEvent::Loaded(Ok(vec![
            bug_record(2, "Login fails", BugStatus::Open, BugPriority::High),
            bug_record(1, "Typo", BugStatus::Closed, BugPriority::Low),
        ])));
        app
    }

    #[test]
    fn reload_failure_offers_retry() {
        let mut app = App::new("http://localhost/api");
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Some(Command::Reload));
        assert_eq!(app.tracker.list_state(), ListState::Loading);
        app.handle_event(AppEvent::Loaded(Err("connection refused".into())));
        assert!(matches!(app.tracker.list_state(), ListState::Error(_)));
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Some(Command::Reload));
    }

    #[test]
    fn status_filter_cycles_and_clamps_selection() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected, 1);
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.tracker.filter().status, Some(BugStatus::Open));
        assert_eq!(app.tracker.visible().len(), 1);
        assert_eq!(app.selected, 0);
        for _ in 0..4 {
            app.handle_key(key(KeyCode::Char('s')));
        }
        assert_eq!(app.tracker.filter().status, None);
        assert_eq!(app.tracker.visible().len(), 2);
    }

    #[test]
    fn search_mode_captures_typing() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('/')));
        for ch in "typo".chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
        assert_eq!(app.tracker.filter().search, "typo");
        assert_eq!(app.selected_bug().map(|bug| bug.title.as_str()), Some("Typo"));
        app.handle_key(key(KeyCode::Enter));
        assert!(!app.searching);
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Some(Command::Quit));
    }

    #[test]
    fn quick_status_change_sends_next_status() {
        let mut app = loaded_app();
        assert_eq!(
            app.handle_key(key(KeyCode::Char('x'))),
            Some(Command::SetStatus(record_id(2), BugStatus::InProgress))
        );
    }

    #[test]
    fn invalid_form_stays_open_with_error() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.handle_key(key(KeyCode::Enter)), None);
        match &app.screen {
            Screen::Form(form) => {
                assert!(form.error.as_deref().is_some_and(|e| e.contains("Title")));
            }
            other => panic!("unexpected screen: {other:?}"),
        }
    }

    #[test]
    fn edit_form_submits_update_and_closes_on_success() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Enter));
        if let Screen::Form(form) = &app.screen {
            assert_eq!(form.focus, FormField::Title);
        }
        app.handle_key(key(KeyCode::Char('!')));
        let command = app.handle_key(key(KeyCode::Enter));
        let Some(Command::Update(id, body)) = command else {
            panic!("expected update, got {command:?}");
        };
        assert_eq!(id, record_id(2));
        assert_eq!(body["title"], "Login fails!");

        let updated = bug_record(2, "Login fails!", BugStatus::Open, BugPriority::High);
        app.handle_event(AppEvent::Updated(updated));
        assert_eq!(app.screen, Screen::List);
        assert_eq!(app.tracker.visible()[0].title, "Login fails!");
    }

    #[test]
    fn api_error_lands_in_open_form() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('n')));
        app.handle_event(AppEvent::ActionError("Validation failed: Title cannot be empty".into()));
        match &app.screen {
            Screen::Form(form) => assert_eq!(
                form.error.as_deref(),
                Some("Validation failed: Title cannot be empty")
            ),
            other => panic!("unexpected screen: {other:?}"),
        }
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.handle_key(key(KeyCode::Char('n'))), None);
        assert_eq!(app.screen, Screen::List);

        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(
            app.handle_key(key(KeyCode::Char('y'))),
            Some(Command::Delete(record_id(2)))
        );
        app.handle_event(AppEvent::Deleted(record_id(2)));
        assert_eq!(app.tracker.visible().len(), 1);
    }

    #[test]
    fn cycle_option_wraps_through_none() {
        let all = [1, 2];
        assert_eq!(cycle_option(None, &all), Some(1));
        assert_eq!(cycle_option(Some(1), &all), Some(2));
        assert_eq!(cycle_option(Some(2), &all), None);
    }
}
