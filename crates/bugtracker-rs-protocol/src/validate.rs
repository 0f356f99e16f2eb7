//! Shape and value validation for bug payloads.
//!
//! Checks are declared once in [`FIELD_RULES`] and evaluated in table order,
//! so the error list is deterministic: title, description, status, priority,
//! reporter, assignee, then tags by index. Each failure is a typed
//! [`FieldError`] whose `Display` output is the message returned to clients.

use crate::bug::{BugPriority, BugStatus};
use crate::{DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Fields checked by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BugField {
    Title,
    Description,
    Status,
    Priority,
    Reporter,
    Assignee,
    Tags,
}

impl BugField {
    /// JSON key of the field.
    pub fn key(self) -> &'static str {
        match self {
            BugField::Title => "title",
            BugField::Description => "description",
            BugField::Status => "status",
            BugField::Priority => "priority",
            BugField::Reporter => "reporter",
            BugField::Assignee => "assignee",
            BugField::Tags => "tags",
        }
    }

    /// Capitalized label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            BugField::Title => "Title",
            BugField::Description => "Description",
            BugField::Status => "Status",
            BugField::Priority => "Priority",
            BugField::Reporter => "Reporter",
            BugField::Assignee => "Assignee",
            BugField::Tags => "Tags",
        }
    }
}

impl fmt::Display for BugField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Required text field is absent or not text.
    #[error("{0} is required and must be a string")]
    Missing(BugField),
    /// Required text field is blank after trimming.
    #[error("{0} cannot be empty")]
    Empty(BugField),
    /// Text field exceeds its character limit.
    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: BugField, max: usize },
    /// Value outside an enumeration.
    #[error("{field} must be one of: {}", .allowed.join(", "))]
    NotOneOf {
        field: BugField,
        allowed: &'static [&'static str],
    },
    /// Optional field present with a non-text value.
    #[error("{0} must be a string")]
    NotText(BugField),
    /// List field present with a non-array value.
    #[error("{0} must be an array")]
    NotList(BugField),
    /// Tag element that is not text.
    #[error("Tag at index {0} must be a string")]
    TagNotText(usize),
}

/// When an optional field counts as present.
#[derive(Debug, Clone, Copy)]
enum Presence {
    /// Any value under the key, including null.
    Key,
    /// Only truthy values; null, false, 0 and "" are skipped.
    Truthy,
}

/// Declared shape of a field.
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Required text, non-blank, optionally bounded in characters.
    RequiredText { max_chars: Option<usize> },
    /// Enumerated text value when present.
    OneOf {
        allowed: &'static [&'static str],
        presence: Presence,
    },
    /// Text when present and not null.
    OptionalText,
    /// Array of text when present and not null.
    TextList,
}

const FIELD_RULES: &[(BugField, Rule)] = &[
    (
        BugField::Title,
        Rule::RequiredText {
            max_chars: Some(TITLE_MAX_CHARS),
        },
    ),
    (
        BugField::Description,
        Rule::RequiredText {
            max_chars: Some(DESCRIPTION_MAX_CHARS),
        },
    ),
    (
        BugField::Status,
        Rule::OneOf {
            allowed: BugStatus::NAMES,
            presence: Presence::Key,
        },
    ),
    (
        BugField::Priority,
        Rule::OneOf {
            allowed: BugPriority::NAMES,
            presence: Presence::Truthy,
        },
    ),
    (BugField::Reporter, Rule::RequiredText { max_chars: None }),
    (BugField::Assignee, Rule::OptionalText),
    (BugField::Tags, Rule::TextList),
];

/// Outcome of validating a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    /// True when no rule was violated.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violations in evaluation order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Human-readable messages in evaluation order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Validate a bug-like payload. Never fails; all problems are reported in
/// the returned [`ValidationReport`]. A non-object payload is checked as if
/// it had no fields.
pub fn validate_bug(value: &Value) -> ValidationReport {
    let empty = Map::new();
    let map = value.as_object().unwrap_or(&empty);
    let mut errors = Vec::new();
    for (field, rule) in FIELD_RULES {
        check_field(*field, *rule, map.get(field.key()), &mut errors);
    }
    ValidationReport { errors }
}

fn check_field(field: BugField, rule: Rule, value: Option<&Value>, errors: &mut Vec<FieldError>) {
    match rule {
        Rule::RequiredText { max_chars } => match value.and_then(Value::as_str) {
            None => errors.push(FieldError::Missing(field)),
            Some(text) if text.trim().is_empty() => errors.push(FieldError::Empty(field)),
            Some(text) => {
                if let Some(max) = max_chars
                    && text.chars().count() > max
                {
                    errors.push(FieldError::TooLong { field, max });
                }
            }
        },
        Rule::OneOf { allowed, presence } => {
            let present = match presence {
                Presence::Key => value.is_some(),
                Presence::Truthy => value.is_some_and(|value| !is_falsy(value)),
            };
            let accepted = value
                .and_then(Value::as_str)
                .is_some_and(|text| allowed.contains(&text));
            if present && !accepted {
                errors.push(FieldError::NotOneOf { field, allowed });
            }
        }
        Rule::OptionalText => {
            if let Some(value) = value.filter(|value| !value.is_null())
                && !value.is_string()
            {
                errors.push(FieldError::NotText(field));
            }
        }
        Rule::TextList => match value {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        errors.push(FieldError::TagNotText(idx));
                    }
                }
            }
            Some(_) => errors.push(FieldError::NotList(field)),
        },
    }
}

/// JSON values treated as "not provided" by truthiness checks.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize_bug;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn valid_bug() -> Value {
        json!({
            "title": "Login button unresponsive",
            "description": "Clicking login does nothing on Safari",
            "status": "open",
            "priority": "high",
            "reporter": "ana",
            "assignee": "bo",
            "tags": ["ui", "auth"],
        })
    }

    #[test]
    fn accepts_valid_bug() {
        let report = validate_bug(&valid_bug());
        assert!(report.is_valid());
        assert_eq!(report.messages(), Vec::<String>::new());
    }

    #[test]
    fn revalidating_sanitized_input_is_stable() {
        let sanitized = sanitize_bug(&valid_bug());
        assert!(validate_bug(&sanitized).is_valid());
        assert!(validate_bug(&sanitize_bug(&sanitized)).is_valid());
    }

    #[test]
    fn missing_title_reports_only_the_type_error() {
        let mut bug = valid_bug();
        bug.as_object_mut().expect("object").remove("title");
        assert_eq!(
            validate_bug(&bug).messages(),
            vec!["Title is required and must be a string".to_string()]
        );
    }

    #[test]
    fn title_of_101_chars_is_too_long() {
        let mut bug = valid_bug();
        bug["title"] = json!("a".repeat(101));
        assert_eq!(
            validate_bug(&bug).messages(),
            vec!["Title cannot exceed 100 characters".to_string()]
        );
        bug["title"] = json!("a".repeat(100));
        assert!(validate_bug(&bug).is_valid());
    }

    #[test]
    fn description_limit_is_1000_chars() {
        let mut bug = valid_bug();
        bug["description"] = json!("d".repeat(1001));
        assert_eq!(
            validate_bug(&bug).errors(),
            &[FieldError::TooLong {
                field: BugField::Description,
                max: 1000
            }]
        );
    }

    #[test]
    fn blank_fields_report_empty() {
        let mut bug = valid_bug();
        bug["title"] = json!("   ");
        bug["reporter"] = json!("");
        assert_eq!(
            validate_bug(&bug).messages(),
            vec![
                "Title cannot be empty".to_string(),
                "Reporter cannot be empty".to_string(),
            ]
        );
    }

    #[test]
    fn invalid_status_lists_allowed_values() {
        let mut bug = valid_bug();
        bug["status"] = json!("invalid-status");
        assert_eq!(
            validate_bug(&bug).messages(),
            vec!["Status must be one of: open, in-progress, resolved, closed".to_string()]
        );
    }

    #[test]
    fn empty_status_is_still_checked() {
        let mut bug = valid_bug();
        bug["status"] = json!("");
        assert!(!validate_bug(&bug).is_valid());
    }

    #[test]
    fn falsy_priority_is_skipped() {
        for falsy in [json!(""), json!(null), json!(0), json!(false)] {
            let mut bug = valid_bug();
            bug["priority"] = falsy;
            assert!(validate_bug(&bug).is_valid());
        }
        let mut bug = valid_bug();
        bug["priority"] = json!("urgent");
        assert_eq!(
            validate_bug(&bug).messages(),
            vec!["Priority must be one of: low, medium, high, critical".to_string()]
        );
    }

    #[test]
    fn errors_follow_field_order() {
        let bug = json!({
            "status": "nope",
            "priority": "nope",
            "assignee": 7,
            "tags": ["ok", 1, true],
        });
        assert_eq!(
            validate_bug(&bug).messages(),
            vec![
                "Title is required and must be a string".to_string(),
                "Description is required and must be a string".to_string(),
                "Status must be one of: open, in-progress, resolved, closed".to_string(),
                "Priority must be one of: low, medium, high, critical".to_string(),
                "Reporter is required and must be a string".to_string(),
                "Assignee must be a string".to_string(),
                "Tag at index 1 must be a string".to_string(),
                "Tag at index 2 must be a string".to_string(),
            ]
        );
    }

    #[test]
    fn non_array_tags_are_rejected() {
        let mut bug = valid_bug();
        bug["tags"] = json!("ui,auth");
        assert_eq!(
            validate_bug(&bug).messages(),
            vec!["Tags must be an array".to_string()]
        );
    }

    #[test]
    fn non_object_payload_misses_required_fields() {
        let report = validate_bug(&json!(["title"]));
        assert_eq!(
            report.errors(),
            &[
                FieldError::Missing(BugField::Title),
                FieldError::Missing(BugField::Description),
                FieldError::Missing(BugField::Reporter),
            ]
        );
    }
}
