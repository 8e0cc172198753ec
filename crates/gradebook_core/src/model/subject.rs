//! Subject domain model.

use crate::model::validation::{require_positive_credits, require_text, ValidationResult};
use serde::{Deserialize, Serialize};

/// Subject code (`ma_mon`).
pub type SubjectId = String;

/// Subject record as returned by `SubjectService`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Primary key. Immutable after creation.
    pub ma_mon: SubjectId,
    /// Subject title. Must not be blank.
    pub ten_mon: String,
    /// Credit weight. Must be > 0.
    pub so_tin_chi: i64,
    /// Number of score rows referencing this subject. Read-only projection.
    #[serde(default)]
    pub so_luong_dang_ky: u64,
}

impl Subject {
    /// Creates a subject record with no registrations yet.
    pub fn new(ma_mon: impl Into<SubjectId>, ten_mon: impl Into<String>, so_tin_chi: i64) -> Self {
        Self {
            ma_mon: ma_mon.into(),
            ten_mon: ten_mon.into(),
            so_tin_chi,
            so_luong_dang_ky: 0,
        }
    }

    /// Checks caller-editable fields.
    pub fn validate(&self) -> ValidationResult<()> {
        require_text("maMon", &self.ma_mon)?;
        require_text("tenMon", &self.ten_mon)?;
        require_positive_credits(self.so_tin_chi)?;
        Ok(())
    }
}
