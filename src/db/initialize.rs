use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;

/// Initialize the database.
/// Delegates all schema creation / upgrades to the migration engine.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    run_pending_migrations(conn)?;
    Ok(())
}

/// Open the SQLite file at `path` and bring its schema up to date.
pub fn open_db(path: &str) -> AppResult<Connection> {
    let conn = Connection::open(Path::new(path))?;
    init_db(&conn)?;
    Ok(conn)
}
