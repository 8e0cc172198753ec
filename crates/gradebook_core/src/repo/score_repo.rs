//! Score repository.
//!
//! # Invariants
//! - Rows are addressed by the natural `(msv, ma_mon)` key; `id` is a
//!   read-only lookup handle.
//! - Listing order is insertion order (`id ASC`).

use super::{ensure_changed, RepoResult};
use crate::model::key::EntityKey;
use crate::model::score::{Score, ScoreId, ScoreKey};
use rusqlite::{params, Connection, Row};

const SCORE_SELECT_SQL: &str = "SELECT id, msv, ma_mon, diem FROM scores";

/// SQLite-backed score repository.
pub struct SqliteScoreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteScoreRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts one row and returns its surrogate id.
    pub fn insert(&self, score: &Score) -> RepoResult<ScoreId> {
        self.conn.execute(
            "INSERT INTO scores (msv, ma_mon, diem) VALUES (?1, ?2, ?3);",
            params![score.msv.as_str(), score.ma_mon.as_str(), score.diem],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_diem(&self, key: &ScoreKey, diem: f64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE scores
             SET
                diem = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE msv = ?2 AND ma_mon = ?3;",
            params![diem, key.msv.as_str(), key.ma_mon.as_str()],
        )?;
        ensure_changed(changed, || EntityKey::score(key))
    }

    pub fn delete(&self, key: &ScoreKey) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM scores WHERE msv = ?1 AND ma_mon = ?2;",
            params![key.msv.as_str(), key.ma_mon.as_str()],
        )?;
        ensure_changed(changed, || EntityKey::score(key))
    }

    /// Removes every score of one student. Returns the number of rows removed.
    pub fn delete_by_student(&self, msv: &str) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM scores WHERE msv = ?1;", [msv])?)
    }

    /// Removes every score of one subject. Returns the number of rows removed.
    pub fn delete_by_subject(&self, ma_mon: &str) -> RepoResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM scores WHERE ma_mon = ?1;", [ma_mon])?)
    }

    pub fn get(&self, key: &ScoreKey) -> RepoResult<Option<Score>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SCORE_SELECT_SQL} WHERE msv = ?1 AND ma_mon = ?2;"))?;
        let mut rows = stmt.query(params![key.msv.as_str(), key.ma_mon.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_score_row(row)?));
        }
        Ok(None)
    }

    pub fn get_by_id(&self, id: ScoreId) -> RepoResult<Option<Score>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SCORE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_score_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn list(&self) -> RepoResult<Vec<Score>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SCORE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        collect_scores(&mut rows)
    }

    pub fn list_by_student(&self, msv: &str) -> RepoResult<Vec<Score>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SCORE_SELECT_SQL} WHERE msv = ?1 ORDER BY id ASC;"))?;
        let mut rows = stmt.query([msv])?;
        collect_scores(&mut rows)
    }
}

fn collect_scores(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Score>> {
    let mut scores = Vec::new();
    while let Some(row) = rows.next()? {
        scores.push(parse_score_row(row)?);
    }
    Ok(scores)
}

fn parse_score_row(row: &Row<'_>) -> RepoResult<Score> {
    Ok(Score {
        id: Some(row.get("id")?),
        msv: row.get("msv")?,
        ma_mon: row.get("ma_mon")?,
        diem: row.get("diem")?,
    })
}
