use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::run_pending_migrations;
use crate::db::stats;
use crate::errors::{AppError, AppResult};
use crate::utils::colors::{CYAN, GREEN, RED, RESET};
use rusqlite::Connection;
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        info,
    } = cmd
    else {
        return Ok(());
    };

    // only --migrate may create the file; info and check inspect what is there
    if !*migrate && !Path::new(&cfg.database).exists() {
        return Err(AppError::Config(format!(
            "database not found at {}; run `rtimesheet init` or `rtimesheet db --migrate` first",
            cfg.database
        )));
    }

    let conn = Connection::open(&cfg.database)?;

    if *migrate {
        println!("{}▶ Running migrations…{}", CYAN, RESET);
        let applied = run_pending_migrations(&conn)?;
        println!(
            "{}✔ Migration completed:{} {} migration(s) applied.\n",
            GREEN, RESET, applied
        );
    }

    if *info {
        stats::print_db_info(&conn, &cfg.database)?;
    }

    if *check {
        println!("{}▶ Running integrity check…{}", CYAN, RESET);

        let integrity: String = conn.query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

        if integrity == "ok" {
            println!("{}✔ Integrity check passed.{}\n", GREEN, RESET);
        } else {
            println!("{}✘ Integrity check failed:{} {}\n", RED, RESET, integrity);
        }
    }

    Ok(())
}
