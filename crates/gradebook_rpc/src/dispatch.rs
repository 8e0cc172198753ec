//! Endpoints adapting wire calls onto the record service traits.
//!
//! Method names follow the published contract: `add`, `update`, `delete`,
//! `findById`, `getAll` for students and subjects; `add`, `update`,
//! `delete`, `getAll`, `findByKey`, `findById`, `listByStudent` for scores.

use crate::protocol::{decode_params, encode_result, WireError};
use crate::registry::{unknown_method, ServiceEndpoint};
use gradebook_core::{
    parse_iso_date, Score, ScoreId, ScoreService, ServiceError, Student, StudentService, Subject,
    SubjectService,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Student body as sent by callers; the birth date stays textual until parsed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentPayload {
    msv: String,
    ten: String,
    ngay_sinh: String,
    #[serde(default)]
    que_quan: String,
}

impl StudentPayload {
    fn into_student(self) -> Result<Student, ServiceError> {
        let ngay_sinh = parse_iso_date("ngaySinh", &self.ngay_sinh)?;
        Ok(Student::new(self.msv, self.ten, ngay_sinh, self.que_quan))
    }
}

#[derive(Debug, Deserialize)]
struct StudentKeyParams {
    msv: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectKeyParams {
    ma_mon: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreKeyParams {
    msv: String,
    ma_mon: String,
}

#[derive(Debug, Deserialize)]
struct ScoreIdParams {
    id: ScoreId,
}

pub struct StudentEndpoint {
    service: Arc<dyn StudentService>,
}

impl StudentEndpoint {
    pub fn new(service: Arc<dyn StudentService>) -> Self {
        Self { service }
    }
}

impl ServiceEndpoint for StudentEndpoint {
    fn call(&self, method: &str, params: Value) -> Result<Value, WireError> {
        match method {
            "add" => {
                let payload: StudentPayload = decode_params(params)?;
                encode_result(
                    payload
                        .into_student()
                        .and_then(|student| self.service.add(&student)),
                )
            }
            "update" => {
                let payload: StudentPayload = decode_params(params)?;
                encode_result(
                    payload
                        .into_student()
                        .and_then(|student| self.service.update(&student)),
                )
            }
            "delete" => {
                let key: StudentKeyParams = decode_params(params)?;
                encode_result(self.service.delete(&key.msv))
            }
            "findById" => {
                let key: StudentKeyParams = decode_params(params)?;
                encode_result(self.service.find_by_id(&key.msv))
            }
            "getAll" => encode_result(self.service.get_all()),
            other => Err(unknown_method(crate::protocol::STUDENT_SERVICE, other)),
        }
    }
}

pub struct SubjectEndpoint {
    service: Arc<dyn SubjectService>,
}

impl SubjectEndpoint {
    pub fn new(service: Arc<dyn SubjectService>) -> Self {
        Self { service }
    }
}

impl ServiceEndpoint for SubjectEndpoint {
    fn call(&self, method: &str, params: Value) -> Result<Value, WireError> {
        match method {
            "add" => {
                let subject: Subject = decode_params(params)?;
                encode_result(self.service.add(&subject))
            }
            "update" => {
                let subject: Subject = decode_params(params)?;
                encode_result(self.service.update(&subject))
            }
            "delete" => {
                let key: SubjectKeyParams = decode_params(params)?;
                encode_result(self.service.delete(&key.ma_mon))
            }
            "findById" => {
                let key: SubjectKeyParams = decode_params(params)?;
                encode_result(self.service.find_by_id(&key.ma_mon))
            }
            "getAll" => encode_result(self.service.get_all()),
            other => Err(unknown_method(crate::protocol::SUBJECT_SERVICE, other)),
        }
    }
}

pub struct ScoreEndpoint {
    service: Arc<dyn ScoreService>,
}

impl ScoreEndpoint {
    pub fn new(service: Arc<dyn ScoreService>) -> Self {
        Self { service }
    }
}

impl ServiceEndpoint for ScoreEndpoint {
    fn call(&self, method: &str, params: Value) -> Result<Value, WireError> {
        match method {
            "add" => {
                let score: Score = decode_params(params)?;
                encode_result(self.service.add(&score))
            }
            "update" => {
                let score: Score = decode_params(params)?;
                encode_result(self.service.update(&score))
            }
            "delete" => {
                let key: ScoreKeyParams = decode_params(params)?;
                encode_result(self.service.delete(&key.msv, &key.ma_mon))
            }
            "getAll" => encode_result(self.service.get_all()),
            "findByKey" => {
                let key: ScoreKeyParams = decode_params(params)?;
                encode_result(self.service.find_by_key(&key.msv, &key.ma_mon))
            }
            "findById" => {
                let params: ScoreIdParams = decode_params(params)?;
                encode_result(self.service.find_by_id(params.id))
            }
            "listByStudent" => {
                let key: StudentKeyParams = decode_params(params)?;
                encode_result(self.service.list_by_student(&key.msv))
            }
            other => Err(unknown_method(crate::protocol::SCORE_SERVICE, other)),
        }
    }
}
