//! Subject repository.
//!
//! # Invariants
//! - Listing order is insertion order (`rowid ASC`).
//! - `so_luong_dang_ky` is `COUNT(scores)` at query time.

use super::{ensure_changed, RepoError, RepoResult};
use crate::model::key::EntityKey;
use crate::model::subject::Subject;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SUBJECT_SELECT_SQL: &str = "SELECT
    m.ma_mon,
    m.ten_mon,
    m.so_tin_chi,
    (SELECT COUNT(*) FROM scores sc WHERE sc.ma_mon = m.ma_mon) AS so_luong_dang_ky
FROM subjects m";

/// SQLite-backed subject repository.
pub struct SqliteSubjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn exists(&self, ma_mon: &str) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM subjects WHERE ma_mon = ?1;",
                [ma_mon],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Inserts editable fields only; `so_luong_dang_ky` is never stored.
    pub fn insert(&self, subject: &Subject) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO subjects (ma_mon, ten_mon, so_tin_chi) VALUES (?1, ?2, ?3);",
            params![
                subject.ma_mon.as_str(),
                subject.ten_mon.as_str(),
                subject.so_tin_chi,
            ],
        )?;
        Ok(())
    }

    pub fn update(&self, subject: &Subject) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE subjects
             SET
                ten_mon = ?1,
                so_tin_chi = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE ma_mon = ?3;",
            params![
                subject.ten_mon.as_str(),
                subject.so_tin_chi,
                subject.ma_mon.as_str(),
            ],
        )?;
        ensure_changed(changed, || EntityKey::subject(subject.ma_mon.as_str()))
    }

    pub fn delete(&self, ma_mon: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM subjects WHERE ma_mon = ?1;", [ma_mon])?;
        ensure_changed(changed, || EntityKey::subject(ma_mon))
    }

    pub fn get(&self, ma_mon: &str) -> RepoResult<Option<Subject>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBJECT_SELECT_SQL} WHERE m.ma_mon = ?1;"))?;
        let mut rows = stmt.query([ma_mon])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subject_row(row)?));
        }
        Ok(None)
    }

    pub fn list(&self) -> RepoResult<Vec<Subject>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBJECT_SELECT_SQL} ORDER BY m.rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(parse_subject_row(row)?);
        }
        Ok(subjects)
    }
}

fn parse_subject_row(row: &Row<'_>) -> RepoResult<Subject> {
    let ma_mon: String = row.get("ma_mon")?;
    let count: i64 = row.get("so_luong_dang_ky")?;
    let so_luong_dang_ky = u64::try_from(count).map_err(|_| {
        RepoError::InvalidData(format!("negative registration count for `{ma_mon}`"))
    })?;

    Ok(Subject {
        ma_mon,
        ten_mon: row.get("ten_mon")?,
        so_tin_chi: row.get("so_tin_chi")?,
        so_luong_dang_ky,
    })
}
