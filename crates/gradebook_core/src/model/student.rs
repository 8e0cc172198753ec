//! Student domain model.
//!
//! # Invariants
//! - `msv` is stable and never reused for another student.
//! - `diem_tb` is derived from score rows on every read; values supplied by
//!   callers are ignored on write.

use crate::model::validation::{require_text, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Student identifier (`msv`).
pub type StudentId = String;

/// Student record as returned by `StudentService`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Primary key. Immutable after creation.
    pub msv: StudentId,
    /// Display name. Must not be blank.
    pub ten: String,
    /// Birth date, serialized as `YYYY-MM-DD`.
    pub ngay_sinh: NaiveDate,
    /// Hometown, free text.
    #[serde(default)]
    pub que_quan: String,
    /// Mean of all score values for this student; 0 when none exist.
    #[serde(rename = "diemTB", default)]
    pub diem_tb: f64,
}

impl Student {
    /// Creates a student record with no scores yet (`diem_tb = 0`).
    pub fn new(
        msv: impl Into<StudentId>,
        ten: impl Into<String>,
        ngay_sinh: NaiveDate,
        que_quan: impl Into<String>,
    ) -> Self {
        Self {
            msv: msv.into(),
            ten: ten.into(),
            ngay_sinh,
            que_quan: que_quan.into(),
            diem_tb: 0.0,
        }
    }

    /// Checks caller-editable fields.
    ///
    /// `ngay_sinh` is already a calendar date here; textual date input is
    /// checked where it is parsed (`validation::parse_iso_date`).
    pub fn validate(&self) -> ValidationResult<()> {
        require_text("msv", &self.msv)?;
        require_text("ten", &self.ten)?;
        Ok(())
    }
}
