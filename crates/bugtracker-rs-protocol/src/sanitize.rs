//! Input normalization applied before validation.

use serde_json::Value;

/// Text fields trimmed in place.
const TRIMMED_FIELDS: [&str; 4] = ["title", "description", "reporter", "assignee"];
const TAGS_FIELD: &str = "tags";

/// Return a normalized copy of a bug-like payload.
///
/// Text fields are trimmed; a `tags` array loses non-text elements, keeps the
/// rest trimmed and drops entries that end up empty. Anything else (including
/// a non-array `tags` or a non-object payload) passes through untouched and
/// is left for the validator to reject.
pub fn sanitize_bug(value: &Value) -> Value {
    let mut sanitized = value.clone();
    let Some(map) = sanitized.as_object_mut() else {
        return sanitized;
    };

    for key in TRIMMED_FIELDS {
        if let Some(Value::String(text)) = map.get_mut(key) {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
        }
    }

    if let Some(Value::Array(tags)) = map.get_mut(TAGS_FIELD) {
        *tags = tags
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(|tag| Value::String(tag.to_string()))
            .collect();
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn trims_text_fields_and_keeps_the_rest() {
        let input = json!({
            "title": "  Crash  ",
            "description": "\tpanics on save\n",
            "reporter": " ana ",
            "assignee": " bo",
            "status": " open ",
            "votes": 3,
        });
        assert_eq!(
            sanitize_bug(&input),
            json!({
                "title": "Crash",
                "description": "panics on save",
                "reporter": "ana",
                "assignee": "bo",
                "status": " open ",
                "votes": 3,
            })
        );
    }

    #[test]
    fn cleans_tag_list_preserving_order() {
        let input = json!({ "tags": ["  tag1  ", "", "  tag2  ", 123] });
        assert_eq!(sanitize_bug(&input), json!({ "tags": ["tag1", "tag2"] }));
    }

    #[test]
    fn leaves_malformed_fields_for_the_validator() {
        let input = json!({ "title": 42, "tags": "a,b", "assignee": null });
        assert_eq!(sanitize_bug(&input), input);
    }

    #[test]
    fn non_object_passes_through() {
        let input = json!("just text");
        assert_eq!(sanitize_bug(&input), input);
    }
}
