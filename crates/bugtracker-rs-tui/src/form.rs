//! Create/edit form for a single bug.

use bugtracker_rs_protocol::{
    BugId, BugPriority, BugRecord, BugStatus, sanitize_bug, validate_bug,
};
use serde_json::{Value, json};

/// Whether the form creates a new bug or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(BugId),
}

/// Focusable form fields, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Status,
    Priority,
    Reporter,
    Assignee,
    Tags,
}

impl FormField {
    pub const ORDER: [FormField; 7] = [
        FormField::Title,
        FormField::Description,
        FormField::Status,
        FormField::Priority,
        FormField::Reporter,
        FormField::Assignee,
        FormField::Tags,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Status => "Status",
            FormField::Priority => "Priority",
            FormField::Reporter => "Reporter",
            FormField::Assignee => "Assignee",
            FormField::Tags => "Tags",
        }
    }

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or_default()
    }

    fn is_choice(self) -> bool {
        matches!(self, FormField::Status | FormField::Priority)
    }
}

/// Editable copy of a bug's fields. Tags are edited as comma-separated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugForm {
    pub mode: FormMode,
    pub title: String,
    pub description: String,
    pub status: BugStatus,
    pub priority: BugPriority,
    pub reporter: String,
    pub assignee: String,
    pub tags: String,
    pub focus: FormField,
    /// Validation or API error shown under the fields.
    pub error: Option<String>,
}

impl BugForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            status: BugStatus::default(),
            priority: BugPriority::default(),
            reporter: String::new(),
            assignee: String::new(),
            tags: String::new(),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn edit(bug: &BugRecord) -> Self {
        Self {
            mode: FormMode::Edit(bug.id.clone()),
            title: bug.title.clone(),
            description: bug.description.clone(),
            status: bug.status,
            priority: bug.priority,
            reporter: bug.reporter.clone(),
            assignee: bug.assignee.clone().unwrap_or_default(),
            tags: bug.tags.join(", "),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn focus_next(&mut self) {
        let next = (self.focus.position() + 1) % FormField::ORDER.len();
        self.focus = FormField::ORDER[next];
    }

    pub fn focus_prev(&mut self) {
        let len = FormField::ORDER.len();
        let prev = (self.focus.position() + len - 1) % len;
        self.focus = FormField::ORDER[prev];
    }

    /// Advance the focused choice field to its next value.
    pub fn cycle_choice(&mut self) {
        match self.focus {
            FormField::Status => self.status = self.status.next(),
            FormField::Priority => self.priority = self.priority.next(),
            _ => {}
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Reporter => Some(&mut self.reporter),
            FormField::Assignee => Some(&mut self.assignee),
            FormField::Tags => Some(&mut self.tags),
            FormField::Status | FormField::Priority => None,
        }
    }

    /// Type a character; on a choice field a space cycles the value.
    pub fn insert_char(&mut self, ch: char) {
        if self.focus.is_choice() {
            if ch == ' ' {
                self.cycle_choice();
            }
            return;
        }
        if let Some(text) = self.focused_text() {
            text.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    /// Display value of a field.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Status => self.status.as_str(),
            FormField::Priority => self.priority.as_str(),
            FormField::Reporter => &self.reporter,
            FormField::Assignee => &self.assignee,
            FormField::Tags => &self.tags,
        }
    }

    /// Request body for create/update.
    pub fn to_body(&self) -> Value {
        let tags: Vec<&str> = self
            .tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect();
        json!({
            "title": self.title,
            "description": self.description,
            "status": self.status.as_str(),
            "priority": self.priority.as_str(),
            "reporter": self.reporter,
            "assignee": self.assignee,
            "tags": tags,
        })
    }

    /// Run the same sanitize/validate pass as the server; returns the body to
    /// send or the joined validation messages.
    pub fn checked_body(&self) -> Result<Value, String> {
        let body = sanitize_bug(&self.to_body());
        let report = validate_bug(&body);
        if report.is_valid() {
            Ok(body)
        } else {
            Err(report.messages().join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugtracker_rs_test_utils::bug_record;
    use pretty_assertions::assert_eq;

    #[test]
    fn edit_form_round_trips_record_fields() {
        let mut bug = bug_record(1, "Crash", BugStatus::InProgress, BugPriority::High);
        bug.assignee = Some("bob".into());
        bug.tags = vec!["ui".into(), "login".into()];
        let form = BugForm::edit(&bug);
        assert_eq!(form.mode, FormMode::Edit(bug.id.clone()));
        assert_eq!(form.tags, "ui, login");
        let body = form.checked_body().expect("valid");
        assert_eq!(body["status"], "in-progress");
        assert_eq!(body["tags"], json!(["ui", "login"]));
        assert_eq!(body["assignee"], "bob");
    }

    #[test]
    fn typing_targets_focused_field() {
        let mut form = BugForm::create();
        for ch in "Crash".chars() {
            form.insert_char(ch);
        }
        form.focus_next();
        form.insert_char('x');
        form.backspace();
        form.focus_next();
        assert_eq!(form.focus, FormField::Status);
        form.insert_char('z');
        form.insert_char(' ');
        assert_eq!(form.title, "Crash");
        assert_eq!(form.description, "");
        assert_eq!(form.status, BugStatus::InProgress);
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = BugForm::create();
        form.focus_prev();
        assert_eq!(form.focus, FormField::Tags);
        form.focus_next();
        assert_eq!(form.focus, FormField::Title);
    }

    #[test]
    fn blank_form_reports_server_messages() {
        let err = BugForm::create().checked_body().unwrap_err();
        assert_eq!(
            err,
            "Title cannot be empty; Description cannot be empty; Reporter cannot be empty"
        );
    }
}
