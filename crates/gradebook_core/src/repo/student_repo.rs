//! Student repository.
//!
//! # Invariants
//! - Listing order is insertion order (`rowid ASC`).
//! - `diem_tb` is `AVG(scores.diem)` at query time, `0` without scores.

use super::{ensure_changed, RepoError, RepoResult};
use crate::model::key::EntityKey;
use crate::model::student::Student;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

const STUDENT_SELECT_SQL: &str = "SELECT
    s.msv,
    s.ten,
    s.ngay_sinh,
    s.que_quan,
    COALESCE((SELECT AVG(sc.diem) FROM scores sc WHERE sc.msv = s.msv), 0.0) AS diem_tb
FROM students s";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn exists(&self, msv: &str) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM students WHERE msv = ?1;", [msv], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Inserts editable fields only; `diem_tb` is never stored.
    pub fn insert(&self, student: &Student) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO students (msv, ten, ngay_sinh, que_quan) VALUES (?1, ?2, ?3, ?4);",
            params![
                student.msv.as_str(),
                student.ten.as_str(),
                student.ngay_sinh.format(DATE_FORMAT).to_string(),
                student.que_quan.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn update(&self, student: &Student) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students
             SET
                ten = ?1,
                ngay_sinh = ?2,
                que_quan = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE msv = ?4;",
            params![
                student.ten.as_str(),
                student.ngay_sinh.format(DATE_FORMAT).to_string(),
                student.que_quan.as_str(),
                student.msv.as_str(),
            ],
        )?;
        ensure_changed(changed, || EntityKey::student(student.msv.as_str()))
    }

    pub fn delete(&self, msv: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE msv = ?1;", [msv])?;
        ensure_changed(changed, || EntityKey::student(msv))
    }

    pub fn get(&self, msv: &str) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE s.msv = ?1;"))?;
        let mut rows = stmt.query([msv])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    pub fn list(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY s.rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let msv: String = row.get("msv")?;
    let date_text: String = row.get("ngay_sinh")?;
    let ngay_sinh = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{date_text}` in students.ngay_sinh for `{msv}`"
        ))
    })?;

    Ok(Student {
        msv,
        ten: row.get("ten")?,
        ngay_sinh,
        que_quan: row.get("que_quan")?,
        diem_tb: row.get("diem_tb")?,
    })
}
