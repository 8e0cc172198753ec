//! Field validation errors and helpers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Inclusive lower bound for a score value.
pub const MIN_SCORE: f64 = 0.0;
/// Inclusive upper bound for a score value.
pub const MAX_SCORE: f64 = 10.0;

/// Input rejected before any store mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Required text field is empty or whitespace only.
    EmptyField { field: String },
    /// Date text is not an ISO `YYYY-MM-DD` calendar date.
    InvalidDate { field: String, value: String },
    /// Credit count must be strictly positive.
    NonPositiveCredits { value: i64 },
    /// Score must be finite and inside `[MIN_SCORE, MAX_SCORE]`.
    ScoreOutOfRange { value: f64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "`{field}` must not be empty"),
            Self::InvalidDate { field, value } => {
                write!(f, "`{field}` must be a YYYY-MM-DD date, got `{value}`")
            }
            Self::NonPositiveCredits { value } => {
                write!(f, "credit count must be greater than 0, got {value}")
            }
            Self::ScoreOutOfRange { value } => write!(
                f,
                "score must be between {MIN_SCORE} and {MAX_SCORE}, got {value}"
            ),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Rejects blank values for a required text field.
pub fn require_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Parses an ISO calendar date (`YYYY-MM-DD`).
///
/// Surrounding whitespace is ignored; anything else that is not a real
/// calendar day (`2001-02-29`, `2001-13-01`, `01/02/2001`) is rejected.
pub fn parse_iso_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        }
    })
}

/// Rejects credit counts that are zero or negative.
pub fn require_positive_credits(value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::NonPositiveCredits { value });
    }
    Ok(())
}

/// Rejects non-finite scores and scores outside the closed range.
pub fn require_score_in_range(value: f64) -> ValidationResult<()> {
    if !value.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(ValidationError::ScoreOutOfRange { value });
    }
    Ok(())
}
