//! Client-side narrowing of an in-memory bug list.

use crate::bug::{BugPriority, BugRecord, BugStatus};

/// Filter criteria; unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugFilter {
    pub status: Option<BugStatus>,
    pub priority: Option<BugPriority>,
    /// Case-insensitive free-text term; empty disables search.
    pub search: String,
}

impl BugFilter {
    /// True when no criterion is active.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.search.is_empty()
    }

    /// True when `bug` satisfies every active criterion.
    pub fn matches(&self, bug: &BugRecord) -> bool {
        if self.status.is_some_and(|status| bug.status != status) {
            return false;
        }
        if self.priority.is_some_and(|priority| bug.priority != priority) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        let hit = |text: &str| text.to_lowercase().contains(&needle);
        hit(&bug.title)
            || hit(&bug.description)
            || hit(&bug.reporter)
            || bug.assignee.as_deref().is_some_and(hit)
            || bug.tags.iter().any(|tag| hit(tag))
    }
}

/// Records matching `filter`, in their original order. The input is not
/// modified.
pub fn filter_bugs(bugs: &[BugRecord], filter: &BugFilter) -> Vec<BugRecord> {
    bugs.iter()
        .filter(|bug| filter.matches(bug))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewBug;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn bug(id: &str, title: &str, status: BugStatus) -> BugRecord {
        BugRecord::new(
            id.to_string(),
            NewBug {
                title: title.to_string(),
                description: "details".to_string(),
                status,
                priority: BugPriority::Medium,
                reporter: "ana".to_string(),
                assignee: None,
                tags: Vec::new(),
            },
            Utc::now(),
        )
    }

    fn ids(bugs: &[BugRecord]) -> Vec<&str> {
        bugs.iter().map(|bug| bug.id.as_str()).collect()
    }

    #[test]
    fn status_filter_keeps_order() {
        let bugs = vec![
            bug("a", "one", BugStatus::Open),
            bug("b", "two", BugStatus::Resolved),
            bug("c", "three", BugStatus::Open),
        ];
        let filter = BugFilter {
            status: Some(BugStatus::Open),
            ..BugFilter::default()
        };
        assert_eq!(ids(&filter_bugs(&bugs, &filter)), vec!["a", "c"]);
        assert_eq!(bugs.len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut with_assignee = bug("a", "Layout", BugStatus::Open);
        with_assignee.assignee = Some("Zoe".to_string());
        let mut with_tag = bug("b", "Other", BugStatus::Open);
        with_tag.tags = vec!["Safari".to_string()];
        let mut in_description = bug("c", "Third", BugStatus::Open);
        in_description.description = "Breaks in SAFARI only".to_string();
        let bugs = vec![with_assignee, with_tag, in_description];

        let by_assignee = BugFilter {
            search: "zOE".to_string(),
            ..BugFilter::default()
        };
        assert_eq!(ids(&filter_bugs(&bugs, &by_assignee)), vec!["a"]);

        let by_tag = BugFilter {
            search: "safari".to_string(),
            ..BugFilter::default()
        };
        assert_eq!(ids(&filter_bugs(&bugs, &by_tag)), vec!["b", "c"]);
    }

    #[test]
    fn criteria_compose_as_intersection() {
        let bugs = vec![
            bug("a", "Crash on save", BugStatus::Open),
            bug("b", "Crash on load", BugStatus::Closed),
            bug("c", "Typo", BugStatus::Open),
        ];
        let status = BugFilter {
            status: Some(BugStatus::Open),
            ..BugFilter::default()
        };
        let search = BugFilter {
            search: "crash".to_string(),
            ..BugFilter::default()
        };
        let both = BugFilter {
            status: Some(BugStatus::Open),
            search: "crash".to_string(),
            ..BugFilter::default()
        };
        let by_status = filter_bugs(&bugs, &status);
        let by_search = filter_bugs(&bugs, &search);
        let expected: Vec<&str> = ids(&by_status)
            .into_iter()
            .filter(|id| ids(&by_search).contains(id))
            .collect();
        assert_eq!(ids(&filter_bugs(&bugs, &both)), expected);
        assert_eq!(expected, vec!["a"]);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let bugs = vec![bug("a", "one", BugStatus::Closed)];
        assert!(BugFilter::default().is_empty());
        assert_eq!(filter_bugs(&bugs, &BugFilter::default()), bugs);
    }
}
