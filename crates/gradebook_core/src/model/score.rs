//! Score domain model.
//!
//! # Invariants
//! - At most one score exists per `(msv, ma_mon)` pair.
//! - `id` is a storage-assigned lookup handle; identity is the pair.
//! - `diem` lies in `[MIN_SCORE, MAX_SCORE]`.

use crate::model::student::StudentId;
use crate::model::subject::SubjectId;
use crate::model::validation::{require_score_in_range, require_text, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Surrogate score row id assigned on insert.
pub type ScoreId = i64;

/// Natural key of one score row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreKey {
    pub msv: StudentId,
    pub ma_mon: SubjectId,
}

impl ScoreKey {
    pub fn new(msv: impl Into<StudentId>, ma_mon: impl Into<SubjectId>) -> Self {
        Self {
            msv: msv.into(),
            ma_mon: ma_mon.into(),
        }
    }
}

impl Display for ScoreKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.msv, self.ma_mon)
    }
}

/// Score record as returned by `ScoreService`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Assigned by storage; ignored on add/update.
    #[serde(default)]
    pub id: Option<ScoreId>,
    pub msv: StudentId,
    pub ma_mon: SubjectId,
    pub diem: f64,
}

impl Score {
    /// Creates an unsaved score row.
    pub fn new(msv: impl Into<StudentId>, ma_mon: impl Into<SubjectId>, diem: f64) -> Self {
        Self {
            id: None,
            msv: msv.into(),
            ma_mon: ma_mon.into(),
            diem,
        }
    }

    /// Returns the natural `(msv, ma_mon)` key.
    pub fn key(&self) -> ScoreKey {
        ScoreKey::new(self.msv.clone(), self.ma_mon.clone())
    }

    /// Checks key fields and score range.
    pub fn validate(&self) -> ValidationResult<()> {
        require_text("msv", &self.msv)?;
        require_text("maMon", &self.ma_mon)?;
        require_score_in_range(self.diem)?;
        Ok(())
    }
}
