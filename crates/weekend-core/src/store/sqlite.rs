use super::schema::SCHEMA;
use super::{DataStore, StoreTx};
use crate::asset::IterationAsset;
use crate::checklist::{ChecklistCounts, ChecklistItem};
use crate::error::{Result, WeekendError};
use crate::identity::{token_digest, Identity, IdentityProvider, Profile};
use crate::iteration::Iteration;
use crate::project::{NewProject, Project};
use crate::time_log::TimeLog;
use crate::types::{IterationStatus, Role};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Enum column mapping
// ---------------------------------------------------------------------------

impl ToSql for IterationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for IterationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

// ---------------------------------------------------------------------------
// Row mappers
// ---------------------------------------------------------------------------

const PROJECT_COLUMNS: &str = "id, number, title, subtitle, description_work, \
     description_advanced, deliverable, done_when, why_it_matters, sort_order, created_at";

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        number: row.get(1)?,
        title: row.get(2)?,
        subtitle: row.get(3)?,
        description_work: row.get(4)?,
        description_advanced: row.get(5)?,
        deliverable: row.get(6)?,
        done_when: row.get(7)?,
        why_it_matters: row.get(8)?,
        sort_order: row.get(9)?,
        created_at: row.get(10)?,
    })
}

const ITERATION_COLUMNS: &str = "id, project_id, version_label, plan_markdown, learnings_raw, \
     learnings_summary, status, time_spent_minutes, sort_order, created_at, updated_at";

fn iteration_from_row(row: &Row<'_>) -> rusqlite::Result<Iteration> {
    Ok(Iteration {
        id: row.get(0)?,
        project_id: row.get(1)?,
        version_label: row.get(2)?,
        plan_markdown: row.get(3)?,
        learnings_raw: row.get(4)?,
        learnings_summary: row.get(5)?,
        status: row.get(6)?,
        time_spent_minutes: row.get(7)?,
        sort_order: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const CHECKLIST_COLUMNS: &str =
    "id, iteration_id, phase_label, label, sort_order, is_checked, checked_by, checked_at";

fn checklist_from_row(row: &Row<'_>) -> rusqlite::Result<ChecklistItem> {
    Ok(ChecklistItem {
        id: row.get(0)?,
        iteration_id: row.get(1)?,
        phase_label: row.get(2)?,
        label: row.get(3)?,
        sort_order: row.get(4)?,
        is_checked: row.get(5)?,
        checked_by: row.get(6)?,
        checked_at: row.get(7)?,
    })
}

const TIME_LOG_COLUMNS: &str =
    "id, iteration_id, user_id, started_at, ended_at, duration_minutes, note";

fn time_log_from_row(row: &Row<'_>) -> rusqlite::Result<TimeLog> {
    Ok(TimeLog {
        id: row.get(0)?,
        iteration_id: row.get(1)?,
        user_id: row.get(2)?,
        started_at: row.get(3)?,
        ended_at: row.get(4)?,
        duration_minutes: row.get(5)?,
        note: row.get(6)?,
    })
}

const ASSET_COLUMNS: &str = "id, iteration_id, file_url, file_name, file_type, file_size, \
     caption, sort_order, created_at";

fn asset_from_row(row: &Row<'_>) -> rusqlite::Result<IterationAsset> {
    Ok(IterationAsset {
        id: row.get(0)?,
        iteration_id: row.get(1)?,
        file_url: row.get(2)?,
        file_name: row.get(3)?,
        file_type: row.get(4)?,
        file_size: row.get(5)?,
        caption: row.get(6)?,
        sort_order: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const PROFILE_COLUMNS: &str = "id, display_name, role, avatar_url, created_at";

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        display_name: row.get(1)?,
        role: row.get(2)?,
        avatar_url: row.get(3)?,
        created_at: row.get(4)?,
    })
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// SQLite-backed [`DataStore`] and [`IdentityProvider`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| WeekendError::Store("connection lock poisoned".to_string()))
    }
}

impl DataStore for SqliteStore {
    fn begin(&self) -> Result<Box<dyn StoreTx + '_>> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteTx {
            conn,
            finished: false,
        }))
    }
}

impl IdentityProvider for SqliteStore {
    fn resolve(&self, token: &str) -> Result<Option<Identity>> {
        let conn = self.lock()?;
        let identity = conn
            .query_row(
                "SELECT p.id, p.role FROM sessions s JOIN profiles p ON p.id = s.user_id \
                 WHERE s.token_digest = ?1",
                params![token_digest(token)],
                |row| {
                    Ok(Identity {
                        user_id: row.get(0)?,
                        role: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(identity)
    }
}

// ---------------------------------------------------------------------------
// SqliteTx
// ---------------------------------------------------------------------------

struct SqliteTx<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl Drop for SqliteTx<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!(error = %e, "rollback failed");
            }
        }
    }
}

impl SqliteTx<'_> {
    fn query_list<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn query_opt<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>> {
        Ok(self.conn.query_row(sql, params, map).optional()?)
    }
}

impl StoreTx for SqliteTx<'_> {
    // -- projects -----------------------------------------------------------

    fn list_projects(&mut self) -> Result<Vec<Project>> {
        self.query_list(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY sort_order, number"),
            [],
            project_from_row,
        )
    }

    fn get_project(&mut self, id: &str) -> Result<Option<Project>> {
        self.query_opt(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
            params![id],
            project_from_row,
        )
    }

    fn get_project_by_number(&mut self, number: i64) -> Result<Option<Project>> {
        self.query_opt(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE number = ?1"),
            params![number],
            project_from_row,
        )
    }

    fn upsert_project(&mut self, p: &NewProject) -> Result<Project> {
        self.conn.execute(
            "INSERT INTO projects (id, number, title, subtitle, description_work, \
                 description_advanced, deliverable, done_when, why_it_matters, sort_order, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
             ON CONFLICT(number) DO UPDATE SET \
                 title = excluded.title, \
                 subtitle = excluded.subtitle, \
                 description_work = excluded.description_work, \
                 description_advanced = excluded.description_advanced, \
                 deliverable = excluded.deliverable, \
                 done_when = excluded.done_when, \
                 why_it_matters = excluded.why_it_matters, \
                 sort_order = excluded.sort_order",
            params![
                uuid::Uuid::new_v4().to_string(),
                p.number,
                p.title,
                p.subtitle,
                p.description_work,
                p.description_advanced,
                p.deliverable,
                p.done_when,
                p.why_it_matters,
                p.sort_order.unwrap_or(p.number),
                Utc::now(),
            ],
        )?;
        self.get_project_by_number(p.number)?
            .ok_or_else(|| WeekendError::ProjectNotFound(p.number.to_string()))
    }

    // -- iterations ---------------------------------------------------------

    fn list_iterations(&mut self, project_id: Option<&str>) -> Result<Vec<Iteration>> {
        match project_id {
            Some(pid) => self.query_list(
                &format!(
                    "SELECT {ITERATION_COLUMNS} FROM iterations WHERE project_id = ?1 \
                     ORDER BY sort_order, created_at"
                ),
                params![pid],
                iteration_from_row,
            ),
            None => self.query_list(
                &format!("SELECT {ITERATION_COLUMNS} FROM iterations ORDER BY sort_order, created_at"),
                [],
                iteration_from_row,
            ),
        }
    }

    fn get_iteration(&mut self, id: &str) -> Result<Option<Iteration>> {
        self.query_opt(
            &format!("SELECT {ITERATION_COLUMNS} FROM iterations WHERE id = ?1"),
            params![id],
            iteration_from_row,
        )
    }

    fn next_iteration_sort_order(&mut self, project_id: &str) -> Result<i64> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(sort_order) FROM iterations WHERE project_id = ?1",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(max.map_or(0, |m| m + 1))
    }

    fn insert_iteration(&mut self, it: &Iteration) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO iterations ({ITERATION_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                it.id,
                it.project_id,
                it.version_label,
                it.plan_markdown,
                it.learnings_raw,
                it.learnings_summary,
                it.status,
                it.time_spent_minutes,
                it.sort_order,
                it.created_at,
                it.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update_iteration(&mut self, it: &Iteration) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE iterations SET version_label = ?2, plan_markdown = ?3, learnings_raw = ?4, \
                 learnings_summary = ?5, status = ?6, time_spent_minutes = ?7, sort_order = ?8, \
                 updated_at = ?9 \
             WHERE id = ?1",
            params![
                it.id,
                it.version_label,
                it.plan_markdown,
                it.learnings_raw,
                it.learnings_summary,
                it.status,
                it.time_spent_minutes,
                it.sort_order,
                it.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(WeekendError::IterationNotFound(it.id.clone()));
        }
        Ok(())
    }

    fn set_iteration_status(
        &mut self,
        id: &str,
        status: IterationStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE iterations SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status, at],
        )?;
        if changed == 0 {
            return Err(WeekendError::IterationNotFound(id.to_string()));
        }
        Ok(())
    }

    fn delete_iteration(&mut self, id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM iterations WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    // -- checklist ----------------------------------------------------------

    fn list_checklist(&mut self, iteration_id: &str) -> Result<Vec<ChecklistItem>> {
        self.query_list(
            &format!(
                "SELECT {CHECKLIST_COLUMNS} FROM checklist_items WHERE iteration_id = ?1 \
                 ORDER BY sort_order"
            ),
            params![iteration_id],
            checklist_from_row,
        )
    }

    fn get_checklist_item(&mut self, id: &str) -> Result<Option<ChecklistItem>> {
        self.query_opt(
            &format!("SELECT {CHECKLIST_COLUMNS} FROM checklist_items WHERE id = ?1"),
            params![id],
            checklist_from_row,
        )
    }

    fn replace_checklist(&mut self, iteration_id: &str, items: &[ChecklistItem]) -> Result<()> {
        self.conn.execute(
            "DELETE FROM checklist_items WHERE iteration_id = ?1",
            params![iteration_id],
        )?;
        let mut stmt = self.conn.prepare(&format!(
            "INSERT INTO checklist_items ({CHECKLIST_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ))?;
        for item in items {
            stmt.execute(params![
                item.id,
                iteration_id,
                item.phase_label,
                item.label,
                item.sort_order,
                item.is_checked,
                item.checked_by,
                item.checked_at,
            ])?;
        }
        Ok(())
    }

    fn update_checklist_item(&mut self, item: &ChecklistItem) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE checklist_items SET is_checked = ?2, checked_by = ?3, checked_at = ?4 \
             WHERE id = ?1",
            params![item.id, item.is_checked, item.checked_by, item.checked_at],
        )?;
        if changed == 0 {
            return Err(WeekendError::ChecklistItemNotFound(item.id.clone()));
        }
        Ok(())
    }

    fn checklist_counts(&mut self, iteration_id: &str) -> Result<ChecklistCounts> {
        let (total, checked): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_checked), 0) FROM checklist_items \
             WHERE iteration_id = ?1",
            params![iteration_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(ChecklistCounts {
            total: total as usize,
            checked: checked as usize,
        })
    }

    fn checklist_counts_by_iteration(&mut self) -> Result<HashMap<String, ChecklistCounts>> {
        let mut stmt = self.conn.prepare(
            "SELECT iteration_id, COUNT(*), COALESCE(SUM(is_checked), 0) \
             FROM checklist_items GROUP BY iteration_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                ChecklistCounts {
                    total: row.get::<_, i64>(1)? as usize,
                    checked: row.get::<_, i64>(2)? as usize,
                },
            ))
        })?;
        Ok(rows.collect::<rusqlite::Result<HashMap<_, _>>>()?)
    }

    // -- time logs ----------------------------------------------------------

    fn insert_time_log(&mut self, log: &TimeLog) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO time_logs ({TIME_LOG_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                log.id,
                log.iteration_id,
                log.user_id,
                log.started_at,
                log.ended_at,
                log.duration_minutes,
                log.note,
            ],
        )?;
        Ok(())
    }

    fn list_time_logs(&mut self, iteration_id: &str) -> Result<Vec<TimeLog>> {
        self.query_list(
            &format!(
                "SELECT {TIME_LOG_COLUMNS} FROM time_logs WHERE iteration_id = ?1 \
                 ORDER BY started_at"
            ),
            params![iteration_id],
            time_log_from_row,
        )
    }

    // -- assets -------------------------------------------------------------

    fn insert_asset(&mut self, a: &IterationAsset) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO iteration_assets ({ASSET_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                a.id,
                a.iteration_id,
                a.file_url,
                a.file_name,
                a.file_type,
                a.file_size,
                a.caption,
                a.sort_order,
                a.created_at,
            ],
        )?;
        Ok(())
    }

    fn get_asset(&mut self, id: &str) -> Result<Option<IterationAsset>> {
        self.query_opt(
            &format!("SELECT {ASSET_COLUMNS} FROM iteration_assets WHERE id = ?1"),
            params![id],
            asset_from_row,
        )
    }

    fn list_assets(&mut self, iteration_id: &str) -> Result<Vec<IterationAsset>> {
        self.query_list(
            &format!(
                "SELECT {ASSET_COLUMNS} FROM iteration_assets WHERE iteration_id = ?1 \
                 ORDER BY sort_order, created_at"
            ),
            params![iteration_id],
            asset_from_row,
        )
    }

    fn next_asset_sort_order(&mut self, iteration_id: &str) -> Result<i64> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(sort_order) FROM iteration_assets WHERE iteration_id = ?1",
            params![iteration_id],
            |row| row.get(0),
        )?;
        Ok(max.map_or(0, |m| m + 1))
    }

    fn update_asset_caption(&mut self, id: &str, caption: Option<&str>) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE iteration_assets SET caption = ?2 WHERE id = ?1",
            params![id, caption],
        )?;
        Ok(n > 0)
    }

    fn delete_asset(&mut self, id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM iteration_assets WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    // -- profiles -----------------------------------------------------------

    fn insert_profile(&mut self, p: &Profile) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO profiles ({PROFILE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![p.id, p.display_name, p.role, p.avatar_url, p.created_at],
        )?;
        Ok(())
    }

    fn get_profile(&mut self, id: &str) -> Result<Option<Profile>> {
        self.query_opt(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
            params![id],
            profile_from_row,
        )
    }

    fn list_profiles(&mut self) -> Result<Vec<Profile>> {
        self.query_list(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at"),
            [],
            profile_from_row,
        )
    }

    fn insert_session(&mut self, token_digest: &str, user_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (token_digest, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token_digest, user_id, at],
        )?;
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::parse_plan;
    use tempfile::TempDir;

    fn seed_project(store: &SqliteStore) -> Project {
        let mut tx = store.begin().unwrap();
        let p = tx
            .upsert_project(&NewProject {
                number: 1,
                title: "First weekend".into(),
                subtitle: "warm-up".into(),
                description_work: None,
                description_advanced: None,
                deliverable: None,
                done_when: None,
                why_it_matters: None,
                sort_order: None,
            })
            .unwrap();
        tx.commit().unwrap();
        p
    }

    fn seed_iteration(store: &SqliteStore, project_id: &str, plan: &str) -> Iteration {
        let mut tx = store.begin().unwrap();
        let it = Iteration::new(project_id, "v1");
        tx.insert_iteration(&it).unwrap();
        let items: Vec<ChecklistItem> = parse_plan(plan)
            .into_iter()
            .map(|p| p.into_checklist_item(&it.id))
            .collect();
        tx.replace_checklist(&it.id, &items).unwrap();
        tx.commit().unwrap();
        it
    }

    #[test]
    fn upsert_project_is_idempotent_by_number() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = seed_project(&store);
        let mut tx = store.begin().unwrap();
        let again = tx
            .upsert_project(&NewProject {
                number: 1,
                title: "Renamed".into(),
                subtitle: String::new(),
                description_work: None,
                description_advanced: None,
                deliverable: None,
                done_when: None,
                why_it_matters: None,
                sort_order: Some(7),
            })
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.title, "Renamed");
        assert_eq!(again.sort_order, 7);
        assert_eq!(tx.list_projects().unwrap().len(), 1);
    }

    #[test]
    fn iteration_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        let p = seed_project(&store);
        let it = seed_iteration(&store, &p.id, "- a");
        let mut tx = store.begin().unwrap();
        let loaded = tx.get_iteration(&it.id).unwrap().unwrap();
        assert_eq!(loaded.version_label, "v1");
        assert_eq!(loaded.status, IterationStatus::NotStarted);
        assert_eq!(tx.next_iteration_sort_order(&p.id).unwrap(), 1);
        assert_eq!(tx.next_iteration_sort_order("other").unwrap(), 0);
    }

    #[test]
    fn checklist_is_ordered_and_counted() {
        let store = SqliteStore::open_in_memory().unwrap();
        let p = seed_project(&store);
        let it = seed_iteration(&store, &p.id, "## A\n- one\n- two\n## B\n1. three");

        let mut tx = store.begin().unwrap();
        let mut items = tx.list_checklist(&it.id).unwrap();
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["one", "two", "three"]);

        items[0].set_checked(true, "u1", Utc::now());
        tx.update_checklist_item(&items[0]).unwrap();
        assert_eq!(
            tx.checklist_counts(&it.id).unwrap(),
            ChecklistCounts { total: 3, checked: 1 }
        );
        let all = tx.checklist_counts_by_iteration().unwrap();
        assert_eq!(all[&it.id].checked, 1);
    }

    #[test]
    fn dropped_tx_rolls_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        let p = seed_project(&store);
        let it = seed_iteration(&store, &p.id, "- a\n- b");
        {
            let mut tx = store.begin().unwrap();
            tx.replace_checklist(&it.id, &[]).unwrap();
            tx.set_iteration_status(&it.id, IterationStatus::Complete, Utc::now())
                .unwrap();
        }
        let mut tx = store.begin().unwrap();
        assert_eq!(tx.list_checklist(&it.id).unwrap().len(), 2);
        assert_eq!(
            tx.get_iteration(&it.id).unwrap().unwrap().status,
            IterationStatus::NotStarted
        );
    }

    #[test]
    fn deleting_iteration_cascades() {
        let store = SqliteStore::open_in_memory().unwrap();
        let p = seed_project(&store);
        let it = seed_iteration(&store, &p.id, "- a\n- b");
        let mut tx = store.begin().unwrap();
        assert!(tx.delete_iteration(&it.id).unwrap());
        assert!(tx.list_checklist(&it.id).unwrap().is_empty());
        assert!(!tx.delete_iteration(&it.id).unwrap());
    }

    #[test]
    fn unknown_rows_report_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut tx = store.begin().unwrap();
        assert!(matches!(
            tx.set_iteration_status("nope", IterationStatus::Complete, Utc::now()),
            Err(WeekendError::IterationNotFound(_))
        ));
        assert!(tx.get_asset("nope").unwrap().is_none());
    }

    #[test]
    fn sessions_resolve_to_identity() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut tx = store.begin().unwrap();
        tx.insert_profile(&Profile {
            id: "u1".into(),
            display_name: Some("Sam".into()),
            role: Role::Admin,
            avatar_url: None,
            created_at: Utc::now(),
        })
        .unwrap();
        tx.insert_session(&token_digest("tok"), "u1", Utc::now()).unwrap();
        tx.commit().unwrap();

        let identity = store.resolve("tok").unwrap().unwrap();
        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.role, Role::Admin);
        assert!(store.resolve("other").unwrap().is_none());
    }

    #[test]
    fn open_creates_database_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".weekend/portfolio.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            seed_project(&store);
        }
        let store = SqliteStore::open(&path).unwrap();
        let mut tx = store.begin().unwrap();
        assert_eq!(tx.list_projects().unwrap().len(), 1);
    }
}
