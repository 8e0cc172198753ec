//! Repository layer over the SQLite record store.
//!
//! # Responsibility
//! - Keep SQL details out of service orchestration.
//! - Compute derived projections (`diem_tb`, `so_luong_dang_ky`) in the same
//!   query that reads the owning row.
//!
//! # Invariants
//! - Repositories borrow a connection (or an open transaction) and never
//!   begin/commit transactions themselves.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Update/delete of a missing row returns `RepoError::NotFound`.

use crate::db::DbError;
use crate::model::key::EntityKey;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod score_repo;
pub mod student_repo;
pub mod subject_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for gradebook persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(EntityKey),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "{key} not found"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn ensure_changed(changed: usize, key: impl FnOnce() -> EntityKey) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound(key()));
    }
    Ok(())
}
