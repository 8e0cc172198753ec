//! Entity keys used in error reporting.

use crate::model::score::ScoreKey;
use crate::model::student::StudentId;
use crate::model::subject::SubjectId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Primary key of any gradebook record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "entity",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum EntityKey {
    Student { msv: StudentId },
    Subject { ma_mon: SubjectId },
    Score { msv: StudentId, ma_mon: SubjectId },
}

impl EntityKey {
    pub fn student(msv: impl Into<StudentId>) -> Self {
        Self::Student { msv: msv.into() }
    }

    pub fn subject(ma_mon: impl Into<SubjectId>) -> Self {
        Self::Subject {
            ma_mon: ma_mon.into(),
        }
    }

    pub fn score(key: &ScoreKey) -> Self {
        Self::Score {
            msv: key.msv.clone(),
            ma_mon: key.ma_mon.clone(),
        }
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student { msv } => write!(f, "student `{msv}`"),
            Self::Subject { ma_mon } => write!(f, "subject `{ma_mon}`"),
            Self::Score { msv, ma_mon } => write!(f, "score for student `{msv}` in subject `{ma_mon}`"),
        }
    }
}
