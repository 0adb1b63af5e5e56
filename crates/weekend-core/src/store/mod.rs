//! Relational storage behind a unit-of-work interface.
//!
//! Every operation runs inside a [`StoreTx`] obtained from
//! [`DataStore::begin`]. A unit of work holds the store's write lock until it
//! is committed or dropped, so a read-counts-then-write-status sequence for an
//! iteration can never interleave with another writer. Dropping a unit of
//! work without committing discards all of its writes.

mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::asset::IterationAsset;
use crate::checklist::{ChecklistCounts, ChecklistItem};
use crate::error::Result;
use crate::identity::Profile;
use crate::iteration::Iteration;
use crate::project::{NewProject, Project};
use crate::time_log::TimeLog;
use crate::types::IterationStatus;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub trait DataStore: Send + Sync {
    fn begin(&self) -> Result<Box<dyn StoreTx + '_>>;
}

pub trait StoreTx {
    // Projects
    fn list_projects(&mut self) -> Result<Vec<Project>>;
    fn get_project(&mut self, id: &str) -> Result<Option<Project>>;
    fn get_project_by_number(&mut self, number: i64) -> Result<Option<Project>>;
    fn upsert_project(&mut self, project: &NewProject) -> Result<Project>;

    // Iterations
    fn list_iterations(&mut self, project_id: Option<&str>) -> Result<Vec<Iteration>>;
    fn get_iteration(&mut self, id: &str) -> Result<Option<Iteration>>;
    fn next_iteration_sort_order(&mut self, project_id: &str) -> Result<i64>;
    fn insert_iteration(&mut self, iteration: &Iteration) -> Result<()>;
    fn update_iteration(&mut self, iteration: &Iteration) -> Result<()>;
    fn set_iteration_status(
        &mut self,
        id: &str,
        status: IterationStatus,
        at: DateTime<Utc>,
    ) -> Result<()>;
    fn delete_iteration(&mut self, id: &str) -> Result<bool>;

    // Checklist
    fn list_checklist(&mut self, iteration_id: &str) -> Result<Vec<ChecklistItem>>;
    fn get_checklist_item(&mut self, id: &str) -> Result<Option<ChecklistItem>>;
    /// Delete every item of the iteration, then insert `items`.
    fn replace_checklist(&mut self, iteration_id: &str, items: &[ChecklistItem]) -> Result<()>;
    fn update_checklist_item(&mut self, item: &ChecklistItem) -> Result<()>;
    fn checklist_counts(&mut self, iteration_id: &str) -> Result<ChecklistCounts>;
    fn checklist_counts_by_iteration(&mut self) -> Result<HashMap<String, ChecklistCounts>>;

    // Time logs
    fn insert_time_log(&mut self, log: &TimeLog) -> Result<()>;
    fn list_time_logs(&mut self, iteration_id: &str) -> Result<Vec<TimeLog>>;

    // Assets
    fn insert_asset(&mut self, asset: &IterationAsset) -> Result<()>;
    fn get_asset(&mut self, id: &str) -> Result<Option<IterationAsset>>;
    fn list_assets(&mut self, iteration_id: &str) -> Result<Vec<IterationAsset>>;
    fn next_asset_sort_order(&mut self, iteration_id: &str) -> Result<i64>;
    fn update_asset_caption(&mut self, id: &str, caption: Option<&str>) -> Result<bool>;
    fn delete_asset(&mut self, id: &str) -> Result<bool>;

    // Profiles and sessions
    fn insert_profile(&mut self, profile: &Profile) -> Result<()>;
    fn get_profile(&mut self, id: &str) -> Result<Option<Profile>>;
    fn list_profiles(&mut self) -> Result<Vec<Profile>>;
    fn insert_session(&mut self, token_digest: &str, user_id: &str, at: DateTime<Utc>)
        -> Result<()>;

    fn commit(self: Box<Self>) -> Result<()>;
}
