use crate::checklist::ChecklistCounts;
use crate::iteration::Iteration;
use crate::types::IterationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub number: i64,
    pub title: String,
    pub subtitle: String,
    pub description_work: Option<String>,
    pub description_advanced: Option<String>,
    pub deliverable: Option<String>,
    pub done_when: Option<String>,
    pub why_it_matters: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// Seed input for a project, matched on `number` when upserting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub number: i64,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description_work: Option<String>,
    #[serde(default)]
    pub description_advanced: Option<String>,
    #[serde(default)]
    pub deliverable: Option<String>,
    #[serde(default)]
    pub done_when: Option<String>,
    #[serde(default)]
    pub why_it_matters: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithProgress {
    #[serde(flatten)]
    pub project: Project,
    pub iterations: Vec<Iteration>,
    pub total_checklist_items: usize,
    pub completed_checklist_items: usize,
    pub total_time_minutes: i64,
    pub completed_iterations: usize,
    pub in_progress_iterations: usize,
}

impl ProjectWithProgress {
    /// Roll up `iterations` (already filtered to this project) using per-iteration
    /// checklist counts keyed by iteration id.
    pub fn build(
        project: Project,
        iterations: Vec<Iteration>,
        counts: &HashMap<String, ChecklistCounts>,
    ) -> Self {
        let (total, checked) = iterations
            .iter()
            .filter_map(|i| counts.get(&i.id))
            .fold((0, 0), |(t, c), n| (t + n.total, c + n.checked));
        let total_time_minutes = iterations.iter().map(|i| i.time_spent_minutes).sum();
        let completed_iterations = iterations
            .iter()
            .filter(|i| i.status == IterationStatus::Complete)
            .count();
        let in_progress_iterations = iterations
            .iter()
            .filter(|i| i.status == IterationStatus::InProgress)
            .count();

        Self {
            project,
            iterations,
            total_checklist_items: total,
            completed_checklist_items: checked,
            total_time_minutes,
            completed_iterations,
            in_progress_iterations,
        }
    }

    /// Completed checklist items as a whole percentage, 0 when empty.
    pub fn percent_complete(&self) -> u8 {
        if self.total_checklist_items == 0 {
            return 0;
        }
        ((self.completed_checklist_items * 100) / self.total_checklist_items) as u8
    }
}
