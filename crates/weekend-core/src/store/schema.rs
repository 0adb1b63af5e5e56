pub(super) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id            TEXT PRIMARY KEY,
    display_name  TEXT,
    role          TEXT NOT NULL CHECK (role IN ('admin', 'viewer')),
    avatar_url    TEXT,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token_digest  TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id                    TEXT PRIMARY KEY,
    number                INTEGER NOT NULL UNIQUE,
    title                 TEXT NOT NULL,
    subtitle              TEXT NOT NULL DEFAULT '',
    description_work      TEXT,
    description_advanced  TEXT,
    deliverable           TEXT,
    done_when             TEXT,
    why_it_matters        TEXT,
    sort_order            INTEGER NOT NULL DEFAULT 0,
    created_at            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS iterations (
    id                  TEXT PRIMARY KEY,
    project_id          TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    version_label       TEXT NOT NULL,
    plan_markdown       TEXT,
    learnings_raw       TEXT,
    learnings_summary   TEXT,
    status              TEXT NOT NULL CHECK (status IN ('not_started', 'in_progress', 'complete')),
    time_spent_minutes  INTEGER NOT NULL DEFAULT 0,
    sort_order          INTEGER NOT NULL DEFAULT 0,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS iterations_project ON iterations(project_id, sort_order);

CREATE TABLE IF NOT EXISTS checklist_items (
    id            TEXT PRIMARY KEY,
    iteration_id  TEXT NOT NULL REFERENCES iterations(id) ON DELETE CASCADE,
    phase_label   TEXT,
    label         TEXT NOT NULL,
    sort_order    INTEGER NOT NULL,
    is_checked    INTEGER NOT NULL DEFAULT 0,
    checked_by    TEXT,
    checked_at    TEXT
);
CREATE INDEX IF NOT EXISTS checklist_iteration ON checklist_items(iteration_id, sort_order);

CREATE TABLE IF NOT EXISTS time_logs (
    id                TEXT PRIMARY KEY,
    iteration_id      TEXT NOT NULL REFERENCES iterations(id) ON DELETE CASCADE,
    user_id           TEXT NOT NULL,
    started_at        TEXT NOT NULL,
    ended_at          TEXT,
    duration_minutes  INTEGER,
    note              TEXT
);
CREATE INDEX IF NOT EXISTS time_logs_iteration ON time_logs(iteration_id, started_at);

CREATE TABLE IF NOT EXISTS iteration_assets (
    id            TEXT PRIMARY KEY,
    iteration_id  TEXT NOT NULL REFERENCES iterations(id) ON DELETE CASCADE,
    file_url      TEXT NOT NULL,
    file_name     TEXT NOT NULL,
    file_type     TEXT NOT NULL,
    file_size     INTEGER,
    caption       TEXT,
    sort_order    INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS assets_iteration ON iteration_assets(iteration_id, sort_order);
"#;
