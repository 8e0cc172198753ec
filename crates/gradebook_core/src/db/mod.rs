//! Record store: SQLite bootstrap, schema and shared access.
//!
//! # Invariants
//! - Nothing reads or writes records on a connection that `open_db` /
//!   `open_db_in_memory` has not migrated and checked.
//! - SQLite enforces the score foreign keys but never cascades; services
//!   delete dependent scores themselves.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod store;

pub use open::{open_db, open_db_in_memory};
pub use store::Store;

pub type DbResult<T> = Result<T, DbError>;

/// Store failure below the repository layer.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Migrations reported success but a record table is absent.
    MissingTable(&'static str),
    /// A thread panicked while holding the store lock.
    LockPoisoned,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "gradebook schema v{db_version} is newer than this build (v{latest_supported})"
            ),
            Self::MissingTable(table) => write!(f, "gradebook table `{table}` is missing"),
            Self::LockPoisoned => f.write_str("store lock poisoned by a panicked call"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Self::Sqlite(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
