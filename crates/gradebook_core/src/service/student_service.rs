//! Student use-case service.
//!
//! # Invariants
//! - `msv` is immutable: updates address the row by key and never rewrite it.
//! - Deleting a student removes their scores in the same transaction.

use super::{logged, read_back, ServiceError, ServiceResult, StudentService};
use crate::db::Store;
use crate::model::key::EntityKey;
use crate::model::student::Student;
use crate::repo::score_repo::SqliteScoreRepository;
use crate::repo::student_repo::SqliteStudentRepository;
use log::debug;

/// In-process `StudentService` over the shared store.
#[derive(Clone)]
pub struct LocalStudentService {
    store: Store,
}

impl LocalStudentService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl StudentService for LocalStudentService {
    fn add(&self, student: &Student) -> ServiceResult<Student> {
        let key = EntityKey::student(student.msv.as_str());
        let result = student.validate().map_err(ServiceError::from).and_then(|()| {
            self.store.write(|tx| -> ServiceResult<Student> {
                let repo = SqliteStudentRepository::new(tx);
                if repo.exists(&student.msv)? {
                    return Err(ServiceError::DuplicateKey(key.clone()));
                }
                repo.insert(student)?;
                read_back(repo.get(&student.msv)?, "created student missing in read-back")
            })
        });
        logged("student_add", &key, result)
    }

    fn update(&self, student: &Student) -> ServiceResult<Student> {
        let key = EntityKey::student(student.msv.as_str());
        let result = student.validate().map_err(ServiceError::from).and_then(|()| {
            self.store.write(|tx| -> ServiceResult<Student> {
                let repo = SqliteStudentRepository::new(tx);
                repo.update(student)?;
                read_back(repo.get(&student.msv)?, "updated student missing in read-back")
            })
        });
        logged("student_update", &key, result)
    }

    fn delete(&self, msv: &str) -> ServiceResult<()> {
        let key = EntityKey::student(msv);
        let result = self.store.write(|tx| -> ServiceResult<()> {
            let students = SqliteStudentRepository::new(tx);
            if !students.exists(msv)? {
                return Err(ServiceError::NotFound(key.clone()));
            }
            let removed = SqliteScoreRepository::new(tx).delete_by_student(msv)?;
            students.delete(msv)?;
            debug!("event=student_delete module=service cascade_scores={removed}");
            Ok(())
        });
        logged("student_delete", &key, result)
    }

    fn find_by_id(&self, msv: &str) -> ServiceResult<Option<Student>> {
        self.store.read(|conn| {
            SqliteStudentRepository::new(conn)
                .get(msv)
                .map_err(ServiceError::from)
        })
    }

    fn get_all(&self) -> ServiceResult<Vec<Student>> {
        self.store.read(|conn| {
            SqliteStudentRepository::new(conn)
                .list()
                .map_err(ServiceError::from)
        })
    }
}
