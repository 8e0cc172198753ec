//! Core domain logic for the gradebook service host.
//! This crate is the single source of truth for record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{DbError, Store};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::key::EntityKey;
pub use model::score::{Score, ScoreId, ScoreKey};
pub use model::student::{Student, StudentId};
pub use model::subject::{Subject, SubjectId};
pub use model::validation::{parse_iso_date, ValidationError, MAX_SCORE, MIN_SCORE};
pub use repo::{RepoError, RepoResult};
pub use service::{
    LocalScoreService, LocalStudentService, LocalSubjectService, ScoreService, ServiceError,
    ServiceResult, Services, StudentService, SubjectService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
