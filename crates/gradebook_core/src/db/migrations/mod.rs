//! Versioned gradebook schema.
//!
//! # Invariants
//! - Step `n` upgrades `PRAGMA user_version` from `n - 1` to `n`; steps are
//!   contiguous from 1.
//! - All pending steps commit in one transaction, together with the new
//!   `user_version`.
//! - A migrated database holds every table in `REQUIRED_TABLES`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, OptionalExtension};

/// Ordered schema steps; index `i` holds the script for version `i + 1`.
const STEPS: &[&str] = &[include_str!("0001_init.sql")];

/// Tables the record services read and write.
pub const REQUIRED_TABLES: [&str; 3] = ["students", "subjects", "scores"];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    u32::try_from(STEPS.len()).unwrap_or(u32::MAX)
}

/// Brings the schema to `latest_version()` and checks the record tables.
///
/// Emits `db_migrate` with the from/to versions when any step runs.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }

    if from < to {
        let tx = conn.transaction()?;
        for (version, script) in (1u32..).zip(STEPS).skip(from as usize) {
            tx.execute_batch(script)?;
            tx.pragma_update(None, "user_version", version)?;
        }
        tx.commit()?;
        info!("event=db_migrate module=db status=ok from={from} to={to}");
    }

    verify_tables(conn)
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn verify_tables(conn: &Connection) -> DbResult<()> {
    for table in REQUIRED_TABLES {
        let found = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
                [table],
                |_| Ok(()),
            )
            .optional()?;
        if found.is_none() {
            return Err(DbError::MissingTable(table));
        }
    }
    Ok(())
}
