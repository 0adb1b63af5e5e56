use crate::asset::IterationAsset;
use crate::checklist::ChecklistItem;
use crate::error::{Result, WeekendError};
use crate::project::Project;
use crate::time_log::TimeLog;
use crate::types::IterationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iteration {
    pub id: String,
    pub project_id: String,
    pub version_label: String,
    pub plan_markdown: Option<String>,
    pub learnings_raw: Option<String>,
    pub learnings_summary: Option<String>,
    pub status: IterationStatus,
    pub time_spent_minutes: i64,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Iteration {
    pub fn new(project_id: impl Into<String>, version_label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            version_label: version_label.into(),
            plan_markdown: None,
            learnings_raw: None,
            learnings_summary: None,
            status: IterationStatus::NotStarted,
            time_spent_minutes: 0,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewIteration {
    pub project_id: String,
    pub version_label: String,
    #[serde(default)]
    pub plan_markdown: Option<String>,
    #[serde(default)]
    pub status: IterationStatus,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IterationUpdate {
    #[serde(default)]
    pub version_label: Option<String>,
    #[serde(default)]
    pub plan_markdown: Option<String>,
    /// Re-derive the checklist from `plan_markdown`.
    #[serde(default)]
    pub plan_markdown_changed: bool,
    #[serde(default)]
    pub learnings_raw: Option<String>,
    #[serde(default)]
    pub learnings_summary: Option<String>,
    #[serde(default)]
    pub status: Option<IterationStatus>,
    #[serde(default)]
    pub time_spent_minutes: Option<i64>,
}

impl IterationUpdate {
    /// Same rules as creation: a label, when given, must not be blank, and
    /// time spent cannot go negative.
    pub fn validate(&self) -> Result<()> {
        if self
            .version_label
            .as_deref()
            .is_some_and(|l| l.trim().is_empty())
        {
            return Err(WeekendError::Validation("version_label cannot be blank".into()));
        }
        if self.time_spent_minutes.is_some_and(|m| m < 0) {
            return Err(WeekendError::Validation(
                "time_spent_minutes cannot be negative".into(),
            ));
        }
        Ok(())
    }

    /// Copy the provided fields onto `iteration`.
    pub fn apply_fields(&self, iteration: &mut Iteration) {
        if let Some(v) = &self.version_label {
            iteration.version_label = v.trim().to_string();
        }
        if let Some(v) = &self.plan_markdown {
            iteration.plan_markdown = Some(v.clone());
        }
        if let Some(v) = &self.learnings_raw {
            iteration.learnings_raw = Some(v.clone());
        }
        if let Some(v) = &self.learnings_summary {
            iteration.learnings_summary = Some(v.clone());
        }
        if let Some(v) = self.status {
            iteration.status = v;
        }
        if let Some(v) = self.time_spent_minutes {
            iteration.time_spent_minutes = v;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IterationWithDetails {
    #[serde(flatten)]
    pub iteration: Iteration,
    pub project: Project,
    pub checklist_items: Vec<ChecklistItem>,
    pub time_logs: Vec<TimeLog>,
    pub assets: Vec<IterationAsset>,
}
