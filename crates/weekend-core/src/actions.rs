//! Orchestration around the pure core.
//!
//! Each mutating operation checks the caller with [`require_admin`] before it
//! touches anything, then runs inside one unit of work so the checklist edit
//! and any status change it causes are committed together.

use crate::asset::{self, IterationAsset};
use crate::blob::{BlobStore, FsBlobStore};
use crate::config::Config;
use crate::checklist::{ChecklistCounts, ChecklistItem};
use crate::error::{Result, WeekendError};
use crate::identity::{self, require_admin, Identity, IdentityProvider, Profile};
use crate::iteration::{Iteration, IterationUpdate, IterationWithDetails, NewIteration};
use crate::plan::parse_plan;
use crate::project::{NewProject, Project, ProjectWithProgress};
use crate::seed;
use crate::status::{reconcile_counts, status_after_plan_replacement};
use crate::paths;
use crate::store::{DataStore, SqliteStore, StoreTx};
use crate::time_log::{NewTimeLog, TimeLog};
use crate::types::{IterationStatus, Role};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub item: ChecklistItem,
    pub counts: ChecklistCounts,
    pub previous_status: IterationStatus,
    /// Authoritative status after reconciliation.
    pub status: IterationStatus,
    pub status_changed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub iteration: Iteration,
    pub checklist_replaced: bool,
    /// Checked items thrown away by a checklist replacement.
    pub discarded_checked: usize,
    pub checklist_items: usize,
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// The three injected collaborators plus upload policy.
#[derive(Clone)]
pub struct Portfolio {
    store: Arc<dyn DataStore>,
    identity: Arc<dyn IdentityProvider>,
    blobs: Arc<dyn BlobStore>,
    max_upload_bytes: u64,
}

impl Portfolio {
    pub fn new(
        store: Arc<dyn DataStore>,
        identity: Arc<dyn IdentityProvider>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            store,
            identity,
            blobs,
            max_upload_bytes: asset::MAX_FILE_SIZE,
        }
    }

    /// SQLite store and on-disk blobs under an initialised `root`.
    pub fn open(root: &Path, config: &Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::open(&paths::database_path(root))?);
        let blobs = Arc::new(FsBlobStore::new(
            paths::assets_dir(root),
            config.files_base_url(),
        ));
        Ok(Self::new(store.clone(), store, blobs)
            .with_max_upload_bytes(config.storage.max_upload_bytes))
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Look up the caller behind a session token, if any.
    pub fn resolve_identity(&self, token: Option<&str>) -> Result<Option<Identity>> {
        match token {
            Some(t) if !t.is_empty() => self.identity.resolve(t),
            _ => Ok(None),
        }
    }

    pub fn is_admin(&self, actor: Option<&Identity>) -> bool {
        actor.is_some_and(Identity::is_admin)
    }

    // -----------------------------------------------------------------------
    // Reads (public)
    // -----------------------------------------------------------------------

    pub fn projects_with_progress(&self) -> Result<Vec<ProjectWithProgress>> {
        let mut tx = self.store.begin()?;
        let projects = tx.list_projects()?;
        let iterations = tx.list_iterations(None)?;
        let counts = tx.checklist_counts_by_iteration()?;

        let mut by_project: HashMap<String, Vec<Iteration>> = HashMap::new();
        for it in iterations {
            by_project.entry(it.project_id.clone()).or_default().push(it);
        }

        Ok(projects
            .into_iter()
            .map(|p| {
                let its = by_project.remove(&p.id).unwrap_or_default();
                ProjectWithProgress::build(p, its, &counts)
            })
            .collect())
    }

    pub fn project_by_number(&self, number: i64) -> Result<ProjectWithProgress> {
        let mut tx = self.store.begin()?;
        let project = tx
            .get_project_by_number(number)?
            .ok_or_else(|| WeekendError::ProjectNotFound(number.to_string()))?;
        let iterations = tx.list_iterations(Some(&project.id))?;
        let mut counts = HashMap::new();
        for it in &iterations {
            counts.insert(it.id.clone(), tx.checklist_counts(&it.id)?);
        }
        Ok(ProjectWithProgress::build(project, iterations, &counts))
    }

    pub fn iteration_with_details(&self, id: &str) -> Result<IterationWithDetails> {
        let mut tx = self.store.begin()?;
        let iteration = load_iteration(tx.as_mut(), id)?;
        let project = tx
            .get_project(&iteration.project_id)?
            .ok_or_else(|| WeekendError::ProjectNotFound(iteration.project_id.clone()))?;
        Ok(IterationWithDetails {
            checklist_items: tx.list_checklist(id)?,
            time_logs: tx.list_time_logs(id)?,
            assets: tx.list_assets(id)?,
            project,
            iteration,
        })
    }

    // -----------------------------------------------------------------------
    // Iterations
    // -----------------------------------------------------------------------

    pub fn create_iteration(
        &self,
        actor: Option<&Identity>,
        input: NewIteration,
    ) -> Result<Iteration> {
        require_admin(actor)?;
        if input.version_label.trim().is_empty() {
            return Err(WeekendError::Validation("version_label is required".into()));
        }

        let mut tx = self.store.begin()?;
        if tx.get_project(&input.project_id)?.is_none() {
            return Err(WeekendError::ProjectNotFound(input.project_id));
        }

        let mut iteration = Iteration::new(&input.project_id, input.version_label.trim());
        iteration.plan_markdown = input.plan_markdown.filter(|p| !p.is_empty());
        iteration.status = input.status;
        iteration.sort_order = tx.next_iteration_sort_order(&input.project_id)?;
        tx.insert_iteration(&iteration)?;

        let items = checklist_from_plan(&iteration.id, iteration.plan_markdown.as_deref());
        tx.replace_checklist(&iteration.id, &items)?;
        tx.commit()?;

        tracing::info!(
            iteration = %iteration.id,
            project = %iteration.project_id,
            items = items.len(),
            "iteration created"
        );
        Ok(iteration)
    }

    pub fn update_iteration(
        &self,
        actor: Option<&Identity>,
        id: &str,
        update: IterationUpdate,
    ) -> Result<UpdateOutcome> {
        require_admin(actor)?;
        update.validate()?;
        let mut tx = self.store.begin()?;
        let mut iteration = load_iteration(tx.as_mut(), id)?;
        update.apply_fields(&mut iteration);
        iteration.updated_at = Utc::now();

        let mut checklist_replaced = false;
        let mut discarded_checked = 0;
        let mut checklist_items = tx.checklist_counts(id)?.total;

        if update.plan_markdown_changed {
            if let Some(markdown) = update.plan_markdown.as_deref() {
                let before = tx.checklist_counts(id)?;
                let items = checklist_from_plan(id, Some(markdown));
                tx.replace_checklist(id, &items)?;

                if let Some(forced) =
                    status_after_plan_replacement(iteration.status, before.checked, update.status)
                {
                    tracing::info!(
                        iteration = %id,
                        from = %iteration.status,
                        to = %forced,
                        "plan replaced checked items; status demoted"
                    );
                    iteration.status = forced;
                }

                checklist_replaced = true;
                discarded_checked = before.checked;
                checklist_items = items.len();
                tracing::info!(
                    iteration = %id,
                    removed = before.total,
                    inserted = items.len(),
                    "checklist replaced"
                );
            }
        }

        tx.update_iteration(&iteration)?;
        tx.commit()?;

        Ok(UpdateOutcome {
            iteration,
            checklist_replaced,
            discarded_checked,
            checklist_items,
        })
    }

    pub fn delete_iteration(&self, actor: Option<&Identity>, id: &str) -> Result<()> {
        require_admin(actor)?;
        let mut tx = self.store.begin()?;
        let assets = tx.list_assets(id)?;
        if !tx.delete_iteration(id)? {
            return Err(WeekendError::IterationNotFound(id.to_string()));
        }
        tx.commit()?;

        // Rows are gone; leftover files are only wasted space.
        for a in assets {
            if let Some(key) = asset::storage_key_from_url(&a.file_url, self.blobs.base_url()) {
                if let Err(e) = self.blobs.delete(&key) {
                    tracing::warn!(key = %key, error = %e, "failed to delete asset blob");
                }
            }
        }
        tracing::info!(iteration = %id, "iteration deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Checklist
    // -----------------------------------------------------------------------

    /// Check or uncheck one item and reconcile the iteration's status.
    pub fn toggle_checklist_item(
        &self,
        actor: Option<&Identity>,
        item_id: &str,
        checked: bool,
    ) -> Result<ToggleOutcome> {
        let actor = require_admin(actor)?;
        let mut tx = self.store.begin()?;

        let mut item = tx
            .get_checklist_item(item_id)?
            .ok_or_else(|| WeekendError::ChecklistItemNotFound(item_id.to_string()))?;
        let now = Utc::now();
        item.set_checked(checked, &actor.user_id, now);
        tx.update_checklist_item(&item)?;

        let iteration = load_iteration(tx.as_mut(), &item.iteration_id)?;
        let counts = tx.checklist_counts(&iteration.id)?;
        let next = reconcile_counts(iteration.status, counts);
        if let Some(status) = next {
            tx.set_iteration_status(&iteration.id, status, now)?;
        }
        tx.commit()?;

        if let Some(status) = next {
            tracing::info!(
                iteration = %iteration.id,
                from = %iteration.status,
                to = %status,
                checked = counts.checked,
                total = counts.total,
                "status reconciled"
            );
        }

        Ok(ToggleOutcome {
            item,
            counts,
            previous_status: iteration.status,
            status: next.unwrap_or(iteration.status),
            status_changed: next.is_some(),
        })
    }

    // -----------------------------------------------------------------------
    // Time logs
    // -----------------------------------------------------------------------

    pub fn create_time_log(
        &self,
        actor: Option<&Identity>,
        iteration_id: &str,
        input: NewTimeLog,
    ) -> Result<TimeLog> {
        let actor = require_admin(actor)?;
        input.validate()?;
        let mut tx = self.store.begin()?;
        load_iteration(tx.as_mut(), iteration_id)?;
        let log = input.into_time_log(iteration_id, &actor.user_id);
        tx.insert_time_log(&log)?;
        tx.commit()?;
        Ok(log)
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    /// Validate, store the blob, then record it. The blob is removed again if
    /// the row cannot be written.
    pub fn upload_asset(
        &self,
        actor: Option<&Identity>,
        iteration_id: &str,
        file_name: &str,
        declared_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<IterationAsset> {
        require_admin(actor)?;
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(WeekendError::Validation("file_name is required".into()));
        }
        let content_type = asset::resolve_content_type(declared_type, file_name);
        asset::validate_upload(&content_type, bytes.len() as u64, self.max_upload_bytes)?;

        let mut tx = self.store.begin()?;
        load_iteration(tx.as_mut(), iteration_id)?;
        let sort_order = tx.next_asset_sort_order(iteration_id)?;

        let now = Utc::now();
        let key = asset::storage_key(iteration_id, file_name, now);
        let file_url = self.blobs.upload(&key, bytes, &content_type)?;

        let record = IterationAsset {
            id: uuid::Uuid::new_v4().to_string(),
            iteration_id: iteration_id.to_string(),
            file_url,
            file_name: file_name.to_string(),
            file_type: content_type,
            file_size: Some(bytes.len() as i64),
            caption: None,
            sort_order,
            created_at: now,
        };

        let persisted = match tx.insert_asset(&record) {
            Ok(()) => tx.commit(),
            Err(e) => Err(e),
        };
        if let Err(e) = persisted {
            if let Err(cleanup) = self.blobs.delete(&key) {
                tracing::warn!(key = %key, error = %cleanup, "failed to remove orphaned blob");
            }
            return Err(e);
        }

        tracing::info!(asset = %record.id, iteration = %iteration_id, key = %key, "asset uploaded");
        Ok(record)
    }

    pub fn update_asset_caption(
        &self,
        actor: Option<&Identity>,
        asset_id: &str,
        caption: Option<&str>,
    ) -> Result<IterationAsset> {
        require_admin(actor)?;
        let caption = caption.map(str::trim).filter(|c| !c.is_empty());
        let mut tx = self.store.begin()?;
        if !tx.update_asset_caption(asset_id, caption)? {
            return Err(WeekendError::AssetNotFound(asset_id.to_string()));
        }
        let updated = tx
            .get_asset(asset_id)?
            .ok_or_else(|| WeekendError::AssetNotFound(asset_id.to_string()))?;
        tx.commit()?;
        Ok(updated)
    }

    /// Remove the row, then its blob. The row never outlives its file; a
    /// failed blob delete leaves an orphaned file and a warning.
    pub fn delete_asset(&self, actor: Option<&Identity>, asset_id: &str) -> Result<()> {
        require_admin(actor)?;
        let mut tx = self.store.begin()?;
        let record = tx
            .get_asset(asset_id)?
            .ok_or_else(|| WeekendError::AssetNotFound(asset_id.to_string()))?;
        tx.delete_asset(asset_id)?;
        tx.commit()?;

        match asset::storage_key_from_url(&record.file_url, self.blobs.base_url()) {
            Some(key) => {
                if let Err(e) = self.blobs.delete(&key) {
                    tracing::warn!(key = %key, error = %e, "failed to delete asset blob");
                }
            }
            None => tracing::warn!(
                asset = %asset_id,
                url = %record.file_url,
                "asset URL is outside blob storage; leaving file in place"
            ),
        }
        tracing::info!(asset = %asset_id, "asset deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Projects and users
    // -----------------------------------------------------------------------

    /// Upsert projects by number; running it twice changes nothing.
    pub fn seed_projects(
        &self,
        actor: Option<&Identity>,
        projects: &[NewProject],
    ) -> Result<Vec<Project>> {
        require_admin(actor)?;
        self.seed_projects_unchecked(projects)
    }

    /// Seeding for local operators (the CLI), who own the database outright.
    pub fn seed_projects_unchecked(&self, projects: &[NewProject]) -> Result<Vec<Project>> {
        seed::validate_projects(projects)?;
        let mut tx = self.store.begin()?;
        let mut out = Vec::with_capacity(projects.len());
        for p in projects {
            out.push(tx.upsert_project(p)?);
        }
        tx.commit()?;
        tracing::info!(count = out.len(), "projects seeded");
        Ok(out)
    }

    pub fn create_user(&self, display_name: Option<&str>, role: Role) -> Result<Profile> {
        let profile = Profile {
            id: uuid::Uuid::new_v4().to_string(),
            display_name: display_name.map(str::to_string),
            role,
            avatar_url: None,
            created_at: Utc::now(),
        };
        let mut tx = self.store.begin()?;
        tx.insert_profile(&profile)?;
        tx.commit()?;
        Ok(profile)
    }

    pub fn list_users(&self) -> Result<Vec<Profile>> {
        self.store.begin()?.list_profiles()
    }

    /// Create a session for `user_id` and return the bearer token. Only the
    /// token's digest is stored.
    pub fn issue_session(&self, user_id: &str) -> Result<String> {
        let mut tx = self.store.begin()?;
        if tx.get_profile(user_id)?.is_none() {
            return Err(WeekendError::UserNotFound(user_id.to_string()));
        }
        let token = identity::generate_session_token();
        tx.insert_session(&identity::token_digest(&token), user_id, Utc::now())?;
        tx.commit()?;
        Ok(token)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_iteration(tx: &mut dyn StoreTx, id: &str) -> Result<Iteration> {
    tx.get_iteration(id)?
        .ok_or_else(|| WeekendError::IterationNotFound(id.to_string()))
}

fn checklist_from_plan(iteration_id: &str, markdown: Option<&str>) -> Vec<ChecklistItem> {
    parse_plan(markdown.unwrap_or_default())
        .into_iter()
        .map(|p| p.into_checklist_item(iteration_id))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASE: &str = "http://localhost:3141/files";

    struct Fixture {
        _dir: TempDir,
        portfolio: Portfolio,
        admin: Identity,
        viewer: Identity,
        project: Project,
        blob_dir: std::path::PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let blob_dir = dir.path().join("assets");
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let blobs = Arc::new(FsBlobStore::new(&blob_dir, BASE));
        let portfolio = Portfolio::new(store.clone(), store, blobs);

        let admin_profile = portfolio.create_user(Some("Admin"), Role::Admin).unwrap();
        let viewer_profile = portfolio.create_user(None, Role::Viewer).unwrap();
        let project = portfolio
            .seed_projects_unchecked(&[NewProject {
                number: 1,
                title: "Weekend one".into(),
                subtitle: String::new(),
                description_work: None,
                description_advanced: None,
                deliverable: None,
                done_when: None,
                why_it_matters: None,
                sort_order: None,
            }])
            .unwrap()
            .remove(0);

        Fixture {
            _dir: dir,
            portfolio,
            admin: Identity {
                user_id: admin_profile.id,
                role: Role::Admin,
            },
            viewer: Identity {
                user_id: viewer_profile.id,
                role: Role::Viewer,
            },
            project,
            blob_dir,
        }
    }

    fn create(f: &Fixture, plan: &str) -> Iteration {
        f.portfolio
            .create_iteration(
                Some(&f.admin),
                NewIteration {
                    project_id: f.project.id.clone(),
                    version_label: "v1".into(),
                    plan_markdown: Some(plan.into()),
                    status: IterationStatus::NotStarted,
                },
            )
            .unwrap()
    }

    fn item_ids(f: &Fixture, iteration_id: &str) -> Vec<String> {
        f.portfolio
            .iteration_with_details(iteration_id)
            .unwrap()
            .checklist_items
            .into_iter()
            .map(|i| i.id)
            .collect()
    }

    #[test]
    fn mutations_require_admin() {
        let f = fixture();
        let input = || NewIteration {
            project_id: f.project.id.clone(),
            version_label: "v1".into(),
            plan_markdown: None,
            status: IterationStatus::NotStarted,
        };
        assert!(matches!(
            f.portfolio.create_iteration(None, input()),
            Err(WeekendError::NotAuthenticated)
        ));
        assert!(matches!(
            f.portfolio.create_iteration(Some(&f.viewer), input()),
            Err(WeekendError::NotAuthorized)
        ));
        assert!(f.portfolio.projects_with_progress().unwrap()[0].iterations.is_empty());
        assert!(f.portfolio.is_admin(Some(&f.admin)));
        assert!(!f.portfolio.is_admin(Some(&f.viewer)));
        assert!(!f.portfolio.is_admin(None));
    }

    #[test]
    fn create_parses_plan_and_orders_iterations() {
        let f = fixture();
        let first = create(&f, "## Setup\n1. Install tool\n2. Configure\n## Build\n- Ship it");
        let second = create(&f, "");
        assert_eq!(first.sort_order, 0);
        assert_eq!(second.sort_order, 1);
        assert!(second.plan_markdown.is_none());

        let details = f.portfolio.iteration_with_details(&first.id).unwrap();
        let phases: Vec<Option<&str>> = details
            .checklist_items
            .iter()
            .map(|i| i.phase_label.as_deref())
            .collect();
        assert_eq!(phases, vec![Some("Setup"), Some("Setup"), Some("Build")]);
        assert_eq!(details.project.id, f.project.id);
    }

    #[test]
    fn create_for_unknown_project_fails() {
        let f = fixture();
        let err = f
            .portfolio
            .create_iteration(
                Some(&f.admin),
                NewIteration {
                    project_id: "missing".into(),
                    version_label: "v1".into(),
                    plan_markdown: None,
                    status: IterationStatus::NotStarted,
                },
            )
            .unwrap_err();
        assert!(matches!(err, WeekendError::ProjectNotFound(_)));
    }

    #[test]
    fn toggling_walks_status_forward_and_never_back_to_not_started() {
        let f = fixture();
        let it = create(&f, "- a\n- b");
        let ids = item_ids(&f, &it.id);

        let out = f.portfolio.toggle_checklist_item(Some(&f.admin), &ids[0], true).unwrap();
        assert_eq!(out.status, IterationStatus::InProgress);
        assert!(out.status_changed);
        assert_eq!(out.item.checked_by.as_deref(), Some(f.admin.user_id.as_str()));

        let out = f.portfolio.toggle_checklist_item(Some(&f.admin), &ids[1], true).unwrap();
        assert_eq!(out.status, IterationStatus::Complete);

        let out = f.portfolio.toggle_checklist_item(Some(&f.admin), &ids[1], false).unwrap();
        assert_eq!(out.status, IterationStatus::InProgress);

        let out = f.portfolio.toggle_checklist_item(Some(&f.admin), &ids[0], false).unwrap();
        assert_eq!(out.status, IterationStatus::InProgress);
        assert!(!out.status_changed);
        assert!(out.item.checked_at.is_none());

        let stored = f.portfolio.iteration_with_details(&it.id).unwrap();
        assert_eq!(stored.iteration.status, IterationStatus::InProgress);
    }

    #[test]
    fn concurrent_toggles_on_one_iteration_serialize() {
        const N: usize = 8;
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::open(&dir.path().join("weekend.db")).unwrap());
        let blobs = Arc::new(FsBlobStore::new(dir.path().join("assets"), BASE));
        let portfolio = Portfolio::new(store.clone(), store, blobs);

        let admin = portfolio.create_user(None, Role::Admin).unwrap();
        let admin = Identity {
            user_id: admin.id,
            role: Role::Admin,
        };
        let project = portfolio
            .seed_projects_unchecked(&[NewProject {
                number: 1,
                title: "Weekend one".into(),
                subtitle: String::new(),
                description_work: None,
                description_advanced: None,
                deliverable: None,
                done_when: None,
                why_it_matters: None,
                sort_order: None,
            }])
            .unwrap()
            .remove(0);
        let plan: String = (0..N).map(|i| format!("- task {i}\n")).collect();
        let it = portfolio
            .create_iteration(
                Some(&admin),
                NewIteration {
                    project_id: project.id,
                    version_label: "v1".into(),
                    plan_markdown: Some(plan),
                    status: IterationStatus::NotStarted,
                },
            )
            .unwrap();
        let ids: Vec<String> = portfolio
            .iteration_with_details(&it.id)
            .unwrap()
            .checklist_items
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids.len(), N);

        std::thread::scope(|scope| {
            for id in &ids {
                let portfolio = &portfolio;
                let admin = &admin;
                scope.spawn(move || {
                    portfolio.toggle_checklist_item(Some(admin), id, true).unwrap();
                });
            }
        });

        let details = portfolio.iteration_with_details(&it.id).unwrap();
        assert_eq!(details.iteration.status, IterationStatus::Complete);
        assert_eq!(
            ChecklistCounts::of(&details.checklist_items),
            ChecklistCounts { total: N, checked: N }
        );
    }

    #[test]
    fn update_rejects_blank_label_and_negative_minutes() {
        let f = fixture();
        let it = create(&f, "- a");
        for update in [
            IterationUpdate {
                version_label: Some("   ".into()),
                ..Default::default()
            },
            IterationUpdate {
                time_spent_minutes: Some(-500),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                f.portfolio.update_iteration(Some(&f.admin), &it.id, update),
                Err(WeekendError::Validation(_))
            ));
        }
        let stored = f.portfolio.iteration_with_details(&it.id).unwrap().iteration;
        assert_eq!(stored.version_label, "v1");
        assert_eq!(stored.time_spent_minutes, 0);

        let blank = IterationUpdate {
            version_label: Some("".into()),
            ..Default::default()
        };
        assert!(matches!(
            f.portfolio.update_iteration(Some(&f.viewer), &it.id, blank),
            Err(WeekendError::NotAuthorized)
        ));
    }

    #[test]
    fn seed_checks_admin_before_contents() {
        let f = fixture();
        let bad = [NewProject {
            number: 9,
            title: String::new(),
            subtitle: String::new(),
            description_work: None,
            description_advanced: None,
            deliverable: None,
            done_when: None,
            why_it_matters: None,
            sort_order: None,
        }];
        assert!(matches!(
            f.portfolio.seed_projects(None, &bad),
            Err(WeekendError::NotAuthenticated)
        ));
        assert!(matches!(
            f.portfolio.seed_projects(Some(&f.viewer), &bad),
            Err(WeekendError::NotAuthorized)
        ));
        assert!(matches!(
            f.portfolio.seed_projects(Some(&f.admin), &bad),
            Err(WeekendError::Validation(_))
        ));
        assert_eq!(f.portfolio.projects_with_progress().unwrap().len(), 1);
    }

    #[test]
    fn toggle_unknown_item_fails() {
        let f = fixture();
        assert!(matches!(
            f.portfolio.toggle_checklist_item(Some(&f.admin), "nope", true),
            Err(WeekendError::ChecklistItemNotFound(_))
        ));
    }

    fn complete_all(f: &Fixture, iteration_id: &str) {
        for id in item_ids(f, iteration_id) {
            f.portfolio.toggle_checklist_item(Some(&f.admin), &id, true).unwrap();
        }
    }

    #[test]
    fn replacing_plan_demotes_completed_iteration() {
        let f = fixture();
        let it = create(&f, "- a\n- b");
        complete_all(&f, &it.id);

        let out = f
            .portfolio
            .update_iteration(
                Some(&f.admin),
                &it.id,
                IterationUpdate {
                    plan_markdown: Some("## New\n- c".into()),
                    plan_markdown_changed: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(out.checklist_replaced);
        assert_eq!(out.discarded_checked, 2);
        assert_eq!(out.checklist_items, 1);
        assert_eq!(out.iteration.status, IterationStatus::InProgress);

        let details = f.portfolio.iteration_with_details(&it.id).unwrap();
        assert_eq!(details.checklist_items.len(), 1);
        assert!(!details.checklist_items[0].is_checked);
        assert_eq!(details.iteration.status, IterationStatus::InProgress);
    }

    #[test]
    fn explicit_status_survives_plan_replacement() {
        let f = fixture();
        let it = create(&f, "- a");
        complete_all(&f, &it.id);

        let out = f
            .portfolio
            .update_iteration(
                Some(&f.admin),
                &it.id,
                IterationUpdate {
                    plan_markdown: Some("- b".into()),
                    plan_markdown_changed: true,
                    status: Some(IterationStatus::Complete),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(out.iteration.status, IterationStatus::Complete);
    }

    #[test]
    fn unchanged_plan_keeps_checklist() {
        let f = fixture();
        let it = create(&f, "- a");
        complete_all(&f, &it.id);
        let out = f
            .portfolio
            .update_iteration(
                Some(&f.admin),
                &it.id,
                IterationUpdate {
                    learnings_raw: Some("went fine".into()),
                    time_spent_minutes: Some(120),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!out.checklist_replaced);
        assert_eq!(out.iteration.status, IterationStatus::Complete);
        assert_eq!(out.iteration.time_spent_minutes, 120);
        assert!(f.portfolio.iteration_with_details(&it.id).unwrap().checklist_items[0].is_checked);
    }

    #[test]
    fn progress_reflects_checklist_and_time() {
        let f = fixture();
        let it = create(&f, "- a\n- b\n- c");
        let ids = item_ids(&f, &it.id);
        f.portfolio.toggle_checklist_item(Some(&f.admin), &ids[0], true).unwrap();
        f.portfolio
            .update_iteration(
                Some(&f.admin),
                &it.id,
                IterationUpdate {
                    time_spent_minutes: Some(90),
                    ..Default::default()
                },
            )
            .unwrap();

        let p = f.portfolio.project_by_number(1).unwrap();
        assert_eq!(p.total_checklist_items, 3);
        assert_eq!(p.completed_checklist_items, 1);
        assert_eq!(p.total_time_minutes, 90);
        assert_eq!(p.in_progress_iterations, 1);

        let all = f.portfolio.projects_with_progress().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].completed_checklist_items, 1);
        assert!(matches!(
            f.portfolio.project_by_number(99),
            Err(WeekendError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn time_logs_are_recorded_for_the_actor() {
        let f = fixture();
        let it = create(&f, "");
        let log = f
            .portfolio
            .create_time_log(
                Some(&f.admin),
                &it.id,
                NewTimeLog {
                    started_at: Utc::now(),
                    ended_at: None,
                    duration_minutes: Some(30),
                    note: Some("focus block".into()),
                },
            )
            .unwrap();
        assert_eq!(log.user_id, f.admin.user_id);
        let details = f.portfolio.iteration_with_details(&it.id).unwrap();
        assert_eq!(details.time_logs.len(), 1);
    }

    #[test]
    fn rejected_upload_never_reaches_storage() {
        let f = fixture();
        let it = create(&f, "");
        let err = f
            .portfolio
            .upload_asset(Some(&f.admin), &it.id, "a.zip", Some("application/zip"), b"PK")
            .unwrap_err();
        assert!(matches!(err, WeekendError::UnsupportedFileType(_)));

        let small = f.portfolio.clone().with_max_upload_bytes(1);
        let err = small
            .upload_asset(Some(&f.admin), &it.id, "a.txt", Some("text/plain"), b"too big")
            .unwrap_err();
        assert!(matches!(err, WeekendError::FileTooLarge { .. }));
        assert!(!f.blob_dir.exists());
    }

    #[test]
    fn upload_caption_and_delete_asset() {
        let f = fixture();
        let it = create(&f, "");
        let a = f
            .portfolio
            .upload_asset(Some(&f.admin), &it.id, "shot 1.png", None, b"png-bytes")
            .unwrap();
        assert_eq!(a.file_type, "image/png");
        assert_eq!(a.sort_order, 0);
        assert!(a.file_url.starts_with(BASE));
        let key = asset::storage_key_from_url(&a.file_url, BASE).unwrap();
        assert!(f.blob_dir.join(&key).exists());

        let captioned = f
            .portfolio
            .update_asset_caption(Some(&f.admin), &a.id, Some("  the result  "))
            .unwrap();
        assert_eq!(captioned.caption.as_deref(), Some("the result"));

        let b = f
            .portfolio
            .upload_asset(Some(&f.admin), &it.id, "notes.md", Some("text/markdown"), b"# hi")
            .unwrap();
        assert_eq!(b.sort_order, 1);

        f.portfolio.delete_asset(Some(&f.admin), &a.id).unwrap();
        assert!(!f.blob_dir.join(&key).exists());
        assert_eq!(f.portfolio.iteration_with_details(&it.id).unwrap().assets.len(), 1);
        assert!(matches!(
            f.portfolio.delete_asset(Some(&f.admin), &a.id),
            Err(WeekendError::AssetNotFound(_))
        ));
    }

    #[test]
    fn same_name_uploads_get_distinct_blobs() {
        let f = fixture();
        let it = create(&f, "");
        let upload = || {
            f.portfolio
                .upload_asset(Some(&f.admin), &it.id, "notes.txt", Some("text/plain"), b"x")
                .unwrap()
        };
        let (a, b) = (upload(), upload());
        assert_ne!(a.file_url, b.file_url);

        f.portfolio.delete_asset(Some(&f.admin), &a.id).unwrap();
        let kept = asset::storage_key_from_url(&b.file_url, BASE).unwrap();
        assert!(f.blob_dir.join(kept).exists());
    }

    #[test]
    fn asset_row_is_removed_even_if_blob_delete_fails() {
        let f = fixture();
        let it = create(&f, "");
        let a = f
            .portfolio
            .upload_asset(Some(&f.admin), &it.id, "a.txt", Some("text/plain"), b"x")
            .unwrap();
        // A directory where the file was makes the blob delete fail.
        let path = f.blob_dir.join(asset::storage_key_from_url(&a.file_url, BASE).unwrap());
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        f.portfolio.delete_asset(Some(&f.admin), &a.id).unwrap();
        assert!(f.portfolio.iteration_with_details(&it.id).unwrap().assets.is_empty());
    }

    #[test]
    fn deleting_iteration_removes_its_blobs() {
        let f = fixture();
        let it = create(&f, "- a");
        let a = f
            .portfolio
            .upload_asset(Some(&f.admin), &it.id, "a.txt", Some("text/plain"), b"x")
            .unwrap();
        let key = asset::storage_key_from_url(&a.file_url, BASE).unwrap();

        f.portfolio.delete_iteration(Some(&f.admin), &it.id).unwrap();
        assert!(!f.blob_dir.join(key).exists());
        assert!(matches!(
            f.portfolio.iteration_with_details(&it.id),
            Err(WeekendError::IterationNotFound(_))
        ));
        assert!(matches!(
            f.portfolio.delete_iteration(Some(&f.admin), &it.id),
            Err(WeekendError::IterationNotFound(_))
        ));
    }

    #[test]
    fn sessions_resolve_through_portfolio() {
        let f = fixture();
        let token = f.portfolio.issue_session(&f.admin.user_id).unwrap();
        let who = f.portfolio.resolve_identity(Some(&token)).unwrap().unwrap();
        assert_eq!(who, f.admin);
        assert!(f.portfolio.resolve_identity(None).unwrap().is_none());
        assert!(f.portfolio.resolve_identity(Some("bogus")).unwrap().is_none());
        assert!(matches!(
            f.portfolio.issue_session("ghost"),
            Err(WeekendError::UserNotFound(_))
        ));
    }
}
