use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used for items that appear before any phase header.
pub const UNGROUPED_LABEL: &str = "Tasks";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub iteration_id: String,
    pub phase_label: Option<String>,
    pub label: String,
    pub sort_order: i64,
    pub is_checked: bool,
    pub checked_by: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl ChecklistItem {
    /// Set or clear the checked flag along with its audit fields.
    pub fn set_checked(&mut self, checked: bool, user_id: &str, at: DateTime<Utc>) {
        self.is_checked = checked;
        if checked {
            self.checked_by = Some(user_id.to_string());
            self.checked_at = Some(at);
        } else {
            self.checked_by = None;
            self.checked_at = None;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistCounts {
    pub total: usize,
    pub checked: usize,
}

impl ChecklistCounts {
    pub fn of(items: &[ChecklistItem]) -> Self {
        Self {
            total: items.len(),
            checked: items.iter().filter(|i| i.is_checked).count(),
        }
    }
}

/// Items sharing one phase label, in first-seen order.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseGroup<'a> {
    pub label: &'a str,
    pub items: Vec<&'a ChecklistItem>,
}

impl PhaseGroup<'_> {
    pub fn checked(&self) -> usize {
        self.items.iter().filter(|i| i.is_checked).count()
    }
}

/// Group items by phase label. Groups appear in the order their label is
/// first seen; ungrouped items share the [`UNGROUPED_LABEL`] group.
pub fn group_by_phase(items: &[ChecklistItem]) -> Vec<PhaseGroup<'_>> {
    let mut groups: Vec<PhaseGroup<'_>> = Vec::new();
    for item in items {
        let key = item.phase_label.as_deref().unwrap_or(UNGROUPED_LABEL);
        match groups.iter_mut().find(|g| g.label == key) {
            Some(group) => group.items.push(item),
            None => groups.push(PhaseGroup {
                label: key,
                items: vec![item],
            }),
        }
    }
    groups
}

/// "3/5 complete"
pub fn summarize(items: &[ChecklistItem]) -> String {
    let counts = ChecklistCounts::of(items);
    format!("{}/{} complete", counts.checked, counts.total)
}
