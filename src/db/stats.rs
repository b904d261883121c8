use crate::db::migrate::applied_migrations;
use crate::db::queries::count_entries;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, RESET, YELLOW, colorize_optional};
use rusqlite::{Connection, OptionalExtension};
use std::fs;

/// Summary of the store shown by `db --info`.
#[derive(Debug)]
pub struct DbInfo {
    pub file_size: u64,
    pub entries: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub migrations: Vec<(String, String)>,
}

pub fn collect_db_info(conn: &Connection, db_path: &str) -> AppResult<DbInfo> {
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let entries = count_entries(conn)?;

    let (first_date, last_date): (Option<String>, Option<String>) = conn
        .query_row(
            "SELECT MIN(date), MAX(date) FROM timesheet_entries",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .unwrap_or((None, None));

    Ok(DbInfo {
        file_size,
        entries,
        first_date,
        last_date,
        migrations: applied_migrations(conn)?,
    })
}

pub fn print_db_info(conn: &Connection, db_path: &str) -> AppResult<()> {
    let info = collect_db_info(conn, db_path)?;
    let file_mb = (info.file_size as f64) / (1024.0 * 1024.0);

    println!();
    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);
    println!(
        "{}• Total entries:{} {}{}{}",
        CYAN, RESET, GREEN, info.entries, RESET
    );

    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", colorize_optional(info.first_date.as_deref()));
    println!("    to:   {}", colorize_optional(info.last_date.as_deref()));

    println!("{}• Applied migrations:{}", CYAN, RESET);
    for (applied_at, id) in &info.migrations {
        println!("    {id}  ({applied_at})");
    }

    println!();
    Ok(())
}
