//! Subject use-case service.
//!
//! # Invariants
//! - `ma_mon` is immutable: updates address the row by key and never rewrite it.
//! - Deleting a subject removes its scores in the same transaction.

use super::{logged, read_back, ServiceError, ServiceResult, SubjectService};
use crate::db::Store;
use crate::model::key::EntityKey;
use crate::model::subject::Subject;
use crate::repo::score_repo::SqliteScoreRepository;
use crate::repo::subject_repo::SqliteSubjectRepository;
use log::debug;

/// In-process `SubjectService` over the shared store.
#[derive(Clone)]
pub struct LocalSubjectService {
    store: Store,
}

impl LocalSubjectService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl SubjectService for LocalSubjectService {
    fn add(&self, subject: &Subject) -> ServiceResult<Subject> {
        let key = EntityKey::subject(subject.ma_mon.as_str());
        let result = subject.validate().map_err(ServiceError::from).and_then(|()| {
            self.store.write(|tx| -> ServiceResult<Subject> {
                let repo = SqliteSubjectRepository::new(tx);
                if repo.exists(&subject.ma_mon)? {
                    return Err(ServiceError::DuplicateKey(key.clone()));
                }
                repo.insert(subject)?;
                read_back(repo.get(&subject.ma_mon)?, "created subject missing in read-back")
            })
        });
        logged("subject_add", &key, result)
    }

    fn update(&self, subject: &Subject) -> ServiceResult<Subject> {
        let key = EntityKey::subject(subject.ma_mon.as_str());
        let result = subject.validate().map_err(ServiceError::from).and_then(|()| {
            self.store.write(|tx| -> ServiceResult<Subject> {
                let repo = SqliteSubjectRepository::new(tx);
                repo.update(subject)?;
                read_back(repo.get(&subject.ma_mon)?, "updated subject missing in read-back")
            })
        });
        logged("subject_update", &key, result)
    }

    fn delete(&self, ma_mon: &str) -> ServiceResult<()> {
        let key = EntityKey::subject(ma_mon);
        let result = self.store.write(|tx| -> ServiceResult<()> {
            let subjects = SqliteSubjectRepository::new(tx);
            if !subjects.exists(ma_mon)? {
                return Err(ServiceError::NotFound(key.clone()));
            }
            let removed = SqliteScoreRepository::new(tx).delete_by_subject(ma_mon)?;
            subjects.delete(ma_mon)?;
            debug!("event=subject_delete module=service cascade_scores={removed}");
            Ok(())
        });
        logged("subject_delete", &key, result)
    }

    fn find_by_id(&self, ma_mon: &str) -> ServiceResult<Option<Subject>> {
        self.store.read(|conn| {
            SqliteSubjectRepository::new(conn)
                .get(ma_mon)
                .map_err(ServiceError::from)
        })
    }

    fn get_all(&self) -> ServiceResult<Vec<Subject>> {
        self.store.read(|conn| {
            SqliteSubjectRepository::new(conn)
                .list()
                .map_err(ServiceError::from)
        })
    }
}
