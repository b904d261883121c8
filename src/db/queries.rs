use crate::core::period::DateRange;
use crate::errors::{AppError, AppResult};
use crate::models::entry::{EntryData, TimesheetEntry};
use crate::utils::date;
use chrono::{DateTime, Datelike, Utc};
use rusqlite::{Connection, ErrorCode, Result, Row, params};
use uuid::Uuid;

const SELECT_ENTRIES: &str = "SELECT id, date, task_activity, category_project,
        focus, energy, productivity, enjoyment, challenge,
        outcome_result, learnings_reflections, comments,
        created_at, updated_at
    FROM timesheet_entries";

fn timestamp_column(row: &Row, idx: usize) -> Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    date::from_store(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(AppError::Other(format!("Invalid stored timestamp: {}", raw))),
        )
    })
}

pub fn map_row(row: &Row) -> Result<TimesheetEntry> {
    Ok(TimesheetEntry {
        id: row.get("id")?,
        data: EntryData {
            date: timestamp_column(row, 1)?,
            task_activity: row.get("task_activity")?,
            category_project: row.get("category_project")?,
            focus: row.get("focus")?,
            energy: row.get("energy")?,
            productivity: row.get("productivity")?,
            enjoyment: row.get("enjoyment")?,
            challenge: row.get("challenge")?,
            outcome_result: row.get("outcome_result")?,
            learnings_reflections: row.get("learnings_reflections")?,
            comments: row.get("comments")?,
        },
        created_at: timestamp_column(row, 12)?,
        updated_at: timestamp_column(row, 13)?,
    })
}

/// Constraint failures are the store's own schema validation: report them
/// as client errors, everything else stays an internal failure.
fn map_store_error(e: rusqlite::Error) -> AppError {
    match &e {
        rusqlite::Error::SqliteFailure(inner, msg) if inner.code == ErrorCode::ConstraintViolation => {
            AppError::BadRequest(
                msg.clone()
                    .unwrap_or_else(|| "Entry failed schema validation".to_string()),
            )
        }
        _ => AppError::Db(e),
    }
}

/// Validate and persist a new entry, assigning its id and timestamps.
pub fn insert_entry(conn: &Connection, data: EntryData) -> AppResult<TimesheetEntry> {
    let data = data.normalized();
    data.validate()?;

    let now = date::now();
    let entry = TimesheetEntry {
        id: Uuid::new_v4().to_string(),
        data,
        created_at: now,
        updated_at: now,
    };
    let stamp = date::to_store(&now);
    let d = &entry.data;

    conn.execute(
        "INSERT INTO timesheet_entries (
            id, date, task_activity, category_project,
            focus, energy, productivity, enjoyment, challenge,
            outcome_result, learnings_reflections, comments,
            created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            entry.id,
            date::to_store(&d.date),
            d.task_activity,
            d.category_project,
            d.focus,
            d.energy,
            d.productivity,
            d.enjoyment,
            d.challenge,
            d.outcome_result,
            d.learnings_reflections,
            d.comments,
            stamp,
            stamp,
        ],
    )
    .map_err(map_store_error)?;

    Ok(entry)
}

/// Entries inside `range` (all entries when `None`), newest first.
///
/// Ties on `date` fall back to creation time, then id, so repeated reads of
/// an unchanged store return the same order.
pub fn list_entries(conn: &Connection, range: Option<&DateRange>) -> AppResult<Vec<TimesheetEntry>> {
    let order = "ORDER BY date DESC, created_at DESC, id DESC";

    let rows: Vec<TimesheetEntry> = match range {
        Some(r) => {
            let lower = date::to_store(&r.start);
            // past year 9999 the text form loses its fixed width: no upper bound needed
            let upper = (r.end.year() <= 9999).then(|| date::to_store(&r.end));

            let mut stmt = conn.prepare(&format!(
                "{SELECT_ENTRIES}
                 WHERE date >= ?1 AND (?2 IS NULL OR date < ?2)
                 {order}"
            ))?;
            stmt.query_map(params![lower, upper], map_row)?
                .collect::<Result<_>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!("{SELECT_ENTRIES} {order}"))?;
            stmt.query_map([], map_row)?.collect::<Result<_>>()?
        }
    };

    Ok(rows)
}

pub fn count_entries(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM timesheet_entries", [], |row| {
        row.get(0)
    })?)
}
