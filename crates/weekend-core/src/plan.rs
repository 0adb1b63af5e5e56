//! Markdown plan → checklist conversion.
//!
//! A plan is free-form markdown. Level-2 and deeper headers name the phase
//! that following list items belong to; ordered (`1.`) and unordered (`-`,
//! `*`) list items become checklist entries. Everything else is ignored.

use crate::checklist::ChecklistItem;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One checklist entry extracted from a plan, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedChecklistItem {
    pub phase_label: Option<String>,
    pub label: String,
    pub sort_order: i64,
}

impl ParsedChecklistItem {
    /// Build a fresh, unchecked row for `iteration_id`.
    pub fn into_checklist_item(self, iteration_id: &str) -> ChecklistItem {
        ChecklistItem {
            id: uuid::Uuid::new_v4().to_string(),
            iteration_id: iteration_id.to_string(),
            phase_label: self.phase_label,
            label: self.label,
            sort_order: self.sort_order,
            is_checked: false,
            checked_by: None,
            checked_at: None,
        }
    }
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#{2,}\s+(.+)$").expect("valid regex"))
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s+(.+)$").expect("valid regex"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*]\s+(.+)$").expect("valid regex"))
}

/// Parse `markdown` into checklist items in document order.
///
/// Never fails: lines that are neither a phase header nor a list item are
/// skipped, so malformed input just yields fewer items. `sort_order` starts
/// at 0 and increases by one per item across all phases.
pub fn parse_plan(markdown: &str) -> Vec<ParsedChecklistItem> {
    let mut items = Vec::new();
    let mut current_phase: Option<String> = None;
    let mut sort_order = 0i64;

    for line in markdown.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(caps) = header_re().captures(trimmed) {
            current_phase = Some(caps[1].trim().to_string());
            continue;
        }

        let label = numbered_re()
            .captures(trimmed)
            .or_else(|| bullet_re().captures(trimmed))
            .map(|caps| caps[1].trim().to_string());

        if let Some(label) = label {
            items.push(ParsedChecklistItem {
                phase_label: current_phase.clone(),
                label,
                sort_order,
            });
            sort_order += 1;
        }
    }

    items
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn item(phase: Option<&str>, label: &str, order: i64) -> ParsedChecklistItem {
        ParsedChecklistItem {
            phase_label: phase.map(str::to_string),
            label: label.to_string(),
            sort_order: order,
        }
    }

    #[test]
    fn phases_and_mixed_list_styles() {
        let items = parse_plan("## Setup\n1. Install tool\n2. Configure\n## Build\n- Ship it");
        assert_eq!(
            items,
            vec![
                item(Some("Setup"), "Install tool", 0),
                item(Some("Setup"), "Configure", 1),
                item(Some("Build"), "Ship it", 2),
            ]
        );
    }

    #[test]
    fn item_before_any_header_is_ungrouped() {
        let items = parse_plan("1. Do thing");
        assert_eq!(items, vec![item(None, "Do thing", 0)]);
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(parse_plan("").is_empty());
        assert!(parse_plan("   \n\t\n  ").is_empty());
    }

    #[test]
    fn level_one_header_does_not_set_phase() {
        let items = parse_plan("## Real\n# Title\n- a");
        assert_eq!(items, vec![item(Some("Real"), "a", 0)]);

        let items = parse_plan("# Title\n- a");
        assert_eq!(items[0].phase_label, None);
    }

    #[test]
    fn deeper_headers_set_phase() {
        let items = parse_plan("#### Deep   \n* x");
        assert_eq!(items, vec![item(Some("Deep"), "x", 0)]);
    }

    #[test]
    fn consecutive_headers_keep_the_last() {
        let items = parse_plan("## One\n## Two\n### Three\n- item");
        assert_eq!(items, vec![item(Some("Three"), "item", 0)]);
    }

    #[test]
    fn blank_lines_do_not_reset_phase() {
        let items = parse_plan("## P\n\n- a\n   \n\n- b\n");
        assert_eq!(items, vec![item(Some("P"), "a", 0), item(Some("P"), "b", 1)]);
    }

    #[test]
    fn indentation_and_crlf_are_trimmed() {
        let items = parse_plan("## Phase\r\n    - nested item  \r\n\t10. tenth\r\n");
        assert_eq!(
            items,
            vec![item(Some("Phase"), "nested item", 0), item(Some("Phase"), "tenth", 1)]
        );
    }

    #[test]
    fn prose_and_malformed_markers_are_skipped() {
        let md = "Intro paragraph\n##NoSpace\n-missing space\n1.no space\n> quote\n- kept";
        let items = parse_plan(md);
        assert_eq!(items, vec![item(None, "kept", 0)]);
    }

    #[test]
    fn bare_markers_produce_nothing() {
        assert!(parse_plan("-\n*\n1.\n##").is_empty());
    }

    #[test]
    fn sort_order_is_contiguous_from_zero() {
        let md = "- a\nnoise\n## X\n1. b\n\n* c\n## Y\n## Z\n2. d";
        let orders: Vec<i64> = parse_plan(md).iter().map(|i| i.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn into_checklist_item_is_unchecked() {
        let row = item(Some("P"), "a", 3).into_checklist_item("iter-1");
        assert_eq!(row.iteration_id, "iter-1");
        assert_eq!(row.sort_order, 3);
        assert!(!row.is_checked);
        assert!(row.checked_by.is_none());
        assert!(!row.id.is_empty());
    }
}
