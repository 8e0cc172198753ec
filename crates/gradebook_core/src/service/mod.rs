//! Record services.
//!
//! # Responsibility
//! - Define one service contract per entity (`StudentService`,
//!   `SubjectService`, `ScoreService`), shared by local and remote handles.
//! - Enforce validation, key uniqueness, foreign keys and cascades in the
//!   local implementations.
//!
//! # Invariants
//! - Every mutation runs inside one `Store::write` transaction: checks,
//!   cascades and writes commit together or not at all.
//! - Derived values are read from the store on every call; callers cannot
//!   set them.

use crate::db::Store;
use crate::model::key::EntityKey;
use crate::model::score::{Score, ScoreId};
use crate::model::student::Student;
use crate::model::subject::Subject;
use log::{error, info, warn};
use std::sync::Arc;

mod error;
pub mod score_service;
pub mod student_service;
pub mod subject_service;

pub use error::{ServiceError, ServiceResult};
pub use score_service::LocalScoreService;
pub use student_service::LocalStudentService;
pub use subject_service::LocalSubjectService;

/// Student record operations.
pub trait StudentService: Send + Sync {
    /// Adds a new student and returns the stored record (`diem_tb = 0`).
    fn add(&self, student: &Student) -> ServiceResult<Student>;
    /// Replaces name, birth date and hometown of an existing student.
    fn update(&self, student: &Student) -> ServiceResult<Student>;
    /// Removes a student together with all of their scores.
    fn delete(&self, msv: &str) -> ServiceResult<()>;
    /// Looks up one student; absence is `Ok(None)`.
    fn find_by_id(&self, msv: &str) -> ServiceResult<Option<Student>>;
    /// Returns all students in insertion order.
    fn get_all(&self) -> ServiceResult<Vec<Student>>;
}

/// Subject record operations.
pub trait SubjectService: Send + Sync {
    /// Adds a new subject and returns the stored record.
    fn add(&self, subject: &Subject) -> ServiceResult<Subject>;
    /// Replaces title and credit count of an existing subject.
    fn update(&self, subject: &Subject) -> ServiceResult<Subject>;
    /// Removes a subject together with all scores recorded for it.
    fn delete(&self, ma_mon: &str) -> ServiceResult<()>;
    /// Looks up one subject; absence is `Ok(None)`.
    fn find_by_id(&self, ma_mon: &str) -> ServiceResult<Option<Subject>>;
    /// Returns all subjects in insertion order.
    fn get_all(&self) -> ServiceResult<Vec<Subject>>;
}

/// Score record operations.
pub trait ScoreService: Send + Sync {
    /// Adds a score for an existing student/subject pair.
    fn add(&self, score: &Score) -> ServiceResult<Score>;
    /// Replaces the value of the score identified by `(msv, ma_mon)`.
    fn update(&self, score: &Score) -> ServiceResult<Score>;
    /// Removes the score identified by `(msv, ma_mon)`.
    fn delete(&self, msv: &str, ma_mon: &str) -> ServiceResult<()>;
    /// Returns all scores in insertion order.
    fn get_all(&self) -> ServiceResult<Vec<Score>>;
    /// Looks up one score by its natural key; absence is `Ok(None)`.
    fn find_by_key(&self, msv: &str, ma_mon: &str) -> ServiceResult<Option<Score>>;
    /// Looks up one score by the `id` returned from `add`; absence is `Ok(None)`.
    fn find_by_id(&self, id: ScoreId) -> ServiceResult<Option<Score>>;
    /// Returns one student's scores in insertion order.
    fn list_by_student(&self, msv: &str) -> ServiceResult<Vec<Score>>;
}

/// Resolved service handles injected into callers at startup.
#[derive(Clone)]
pub struct Services {
    pub students: Arc<dyn StudentService>,
    pub subjects: Arc<dyn SubjectService>,
    pub scores: Arc<dyn ScoreService>,
}

impl Services {
    /// Builds in-process services sharing one store.
    pub fn local(store: Store) -> Self {
        Self {
            students: Arc::new(LocalStudentService::new(store.clone())),
            subjects: Arc::new(LocalSubjectService::new(store.clone())),
            scores: Arc::new(LocalScoreService::new(store)),
        }
    }
}

/// Emits one mutation outcome event and passes the result through.
fn logged<T>(event: &str, key: &EntityKey, result: ServiceResult<T>) -> ServiceResult<T> {
    match &result {
        Ok(_) => info!("event={event} module=service status=ok key=\"{key}\""),
        Err(err @ ServiceError::Storage(_)) => error!(
            "event={event} module=service status=error error_code={} key=\"{key}\" error={err}",
            err.code()
        ),
        Err(err) => warn!(
            "event={event} module=service status=rejected error_code={} key=\"{key}\"",
            err.code()
        ),
    }
    result
}

fn read_back<T>(value: Option<T>, details: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::Storage(format!("inconsistent state: {details}")))
}
