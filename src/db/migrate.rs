use crate::db::log::{load_log, ttlog};
use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension, Result};
use tracing::info;

const MIGRATION_APPLIED: &str = "migration_applied";

type Step = fn(&Connection) -> Result<()>;

/// Ordered schema history. Ids are never reused or reordered.
const MIGRATIONS: &[(&str, &str, Step)] = &[
    (
        "20250301_0001_create_timesheet_entries",
        "Created timesheet_entries table",
        create_timesheet_entries,
    ),
    (
        "20250301_0002_index_entries_by_date",
        "Indexed timesheet_entries by (date, created_at)",
        index_entries_by_date,
    ),
];

/// Ensure that the `log` table exists. It also records applied migrations.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn create_timesheet_entries(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS timesheet_entries (
            id                    TEXT PRIMARY KEY NOT NULL,
            date                  TEXT NOT NULL,
            task_activity         TEXT NOT NULL CHECK (length(trim(task_activity)) > 0),
            category_project      TEXT,
            focus                 INTEGER CHECK (focus IS NULL OR focus BETWEEN 1 AND 5),
            energy                INTEGER CHECK (energy IS NULL OR energy BETWEEN 1 AND 5),
            productivity          INTEGER CHECK (productivity IS NULL OR productivity BETWEEN 1 AND 5),
            enjoyment             INTEGER CHECK (enjoyment IS NULL OR enjoyment BETWEEN 1 AND 5),
            challenge             INTEGER CHECK (challenge IS NULL OR challenge BETWEEN 1 AND 5),
            outcome_result        TEXT,
            learnings_reflections TEXT,
            comments              TEXT,
            created_at            TEXT NOT NULL,
            updated_at            TEXT NOT NULL
        );
        "#,
    )
}

fn index_entries_by_date(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_entries_date_created
         ON timesheet_entries(date DESC, created_at DESC);",
    )
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = ?1 AND target = ?2
         LIMIT 1",
    )?;
    Ok(chk
        .query_row([MIGRATION_APPLIED, version], |_| Ok(()))
        .optional()?
        .is_some())
}

/// Public entry point: run all pending migrations, returning how many ran.
///
/// Called by db::initialize::init_db() and `db --migrate`.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;

    for (version, message, step) in MIGRATIONS {
        if is_applied(conn, version)? {
            continue;
        }

        step(conn).map_err(|e| AppError::Migration(format!("{version}: {e}")))?;
        ttlog(conn, MIGRATION_APPLIED, version, message)?;

        info!(migration = %version, "{message}");
        applied += 1;
    }

    Ok(applied)
}

/// Applied migrations as `(applied_at, id)` pairs, oldest first.
pub fn applied_migrations(conn: &Connection) -> AppResult<Vec<(String, String)>> {
    load_log(conn, MIGRATION_APPLIED)
}
