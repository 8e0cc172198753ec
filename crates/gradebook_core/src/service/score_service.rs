//! Score use-case service.
//!
//! # Invariants
//! - Both foreign keys are checked inside the write transaction of every
//!   add/update, so a concurrent cascade delete cannot interleave.
//! - Only `diem` is replaceable; `(msv, ma_mon)` identifies the row.
//! - Range validation runs before the store is touched.

use super::{logged, read_back, ScoreService, ServiceError, ServiceResult};
use crate::db::Store;
use crate::model::key::EntityKey;
use crate::model::score::{Score, ScoreId, ScoreKey};
use crate::repo::score_repo::SqliteScoreRepository;
use crate::repo::student_repo::SqliteStudentRepository;
use crate::repo::subject_repo::SqliteSubjectRepository;
use rusqlite::Connection;

/// In-process `ScoreService` over the shared store.
#[derive(Clone)]
pub struct LocalScoreService {
    store: Store,
}

impl LocalScoreService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl ScoreService for LocalScoreService {
    fn add(&self, score: &Score) -> ServiceResult<Score> {
        let key = score.key();
        let result = score.validate().map_err(ServiceError::from).and_then(|()| {
            self.store.write(|tx| -> ServiceResult<Score> {
                ensure_references_exist(tx, &key)?;
                let repo = SqliteScoreRepository::new(tx);
                if repo.get(&key)?.is_some() {
                    return Err(ServiceError::DuplicateKey(EntityKey::score(&key)));
                }
                let id = repo.insert(score)?;
                Ok(Score {
                    id: Some(id),
                    ..score.clone()
                })
            })
        });
        logged("score_add", &EntityKey::score(&key), result)
    }

    fn update(&self, score: &Score) -> ServiceResult<Score> {
        let key = score.key();
        let result = score.validate().map_err(ServiceError::from).and_then(|()| {
            self.store.write(|tx| -> ServiceResult<Score> {
                ensure_references_exist(tx, &key)?;
                let repo = SqliteScoreRepository::new(tx);
                repo.update_diem(&key, score.diem)?;
                read_back(repo.get(&key)?, "updated score missing in read-back")
            })
        });
        logged("score_update", &EntityKey::score(&key), result)
    }

    fn delete(&self, msv: &str, ma_mon: &str) -> ServiceResult<()> {
        let key = ScoreKey::new(msv, ma_mon);
        let result = self.store.write(|tx| -> ServiceResult<()> {
            SqliteScoreRepository::new(tx).delete(&key)?;
            Ok(())
        });
        logged("score_delete", &EntityKey::score(&key), result)
    }

    fn get_all(&self) -> ServiceResult<Vec<Score>> {
        self.store.read(|conn| {
            SqliteScoreRepository::new(conn)
                .list()
                .map_err(ServiceError::from)
        })
    }

    fn find_by_key(&self, msv: &str, ma_mon: &str) -> ServiceResult<Option<Score>> {
        let key = ScoreKey::new(msv, ma_mon);
        self.store.read(|conn| {
            SqliteScoreRepository::new(conn)
                .get(&key)
                .map_err(ServiceError::from)
        })
    }

    fn find_by_id(&self, id: ScoreId) -> ServiceResult<Option<Score>> {
        self.store.read(|conn| {
            SqliteScoreRepository::new(conn)
                .get_by_id(id)
                .map_err(ServiceError::from)
        })
    }

    fn list_by_student(&self, msv: &str) -> ServiceResult<Vec<Score>> {
        self.store.read(|conn| {
            SqliteScoreRepository::new(conn)
                .list_by_student(msv)
                .map_err(ServiceError::from)
        })
    }
}

/// Fails with `NotFound` naming the first missing referenced key.
fn ensure_references_exist(conn: &Connection, key: &ScoreKey) -> ServiceResult<()> {
    if !SqliteStudentRepository::new(conn).exists(&key.msv)? {
        return Err(ServiceError::NotFound(EntityKey::student(key.msv.as_str())));
    }
    if !SqliteSubjectRepository::new(conn).exists(&key.ma_mon)? {
        return Err(ServiceError::NotFound(EntityKey::subject(
            key.ma_mon.as_str(),
        )));
    }
    Ok(())
}
