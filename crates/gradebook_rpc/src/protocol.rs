//! Line-delimited JSON envelopes exchanged between client and host.
//!
//! # Invariants
//! - One request line produces exactly one response line carrying the same id.
//! - Business errors keep their typed detail (`ValidationError`, `EntityKey`)
//!   so a client rebuilds the same `ServiceError` variant the host produced.

use gradebook_core::{EntityKey, ServiceError, ValidationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// URL scheme under which services are published.
pub const URL_SCHEME: &str = "gradebook";
/// Default host port.
pub const DEFAULT_PORT: u16 = 1099;

pub const STUDENT_SERVICE: &str = "StudentService";
pub const SUBJECT_SERVICE: &str = "SubjectService";
pub const SCORE_SERVICE: &str = "ScoreService";
/// Pseudo-service answering binding queries.
pub const REGISTRY_SERVICE: &str = "registry";

pub const CODE_BAD_REQUEST: &str = "bad_request";
pub const CODE_SERVICE_NOT_BOUND: &str = "service_not_bound";
pub const CODE_UNKNOWN_METHOD: &str = "unknown_method";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub service: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl WireError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(CODE_BAD_REQUEST, message)
    }

    /// Rebuilds the typed service error on the client side.
    ///
    /// Codes that only the transport layer produces, and business codes whose
    /// details cannot be decoded, become `ServiceError::Transport`.
    pub fn into_service_error(self) -> ServiceError {
        let details = self.details.clone();
        match self.code.as_str() {
            "validation" => match details.map(serde_json::from_value::<ValidationError>) {
                Some(Ok(err)) => ServiceError::Validation(err),
                _ => self.malformed(),
            },
            "duplicate_key" => match details.map(serde_json::from_value::<EntityKey>) {
                Some(Ok(key)) => ServiceError::DuplicateKey(key),
                _ => self.malformed(),
            },
            "not_found" => match details.map(serde_json::from_value::<EntityKey>) {
                Some(Ok(key)) => ServiceError::NotFound(key),
                _ => self.malformed(),
            },
            "storage" => match details {
                Some(Value::String(message)) => ServiceError::Storage(message),
                _ => ServiceError::Storage(self.message),
            },
            _ => ServiceError::Transport(format!("{}: {}", self.code, self.message)),
        }
    }

    fn malformed(&self) -> ServiceError {
        ServiceError::Transport(format!(
            "host sent `{}` error without readable details: {}",
            self.code, self.message
        ))
    }
}

impl From<&ServiceError> for WireError {
    fn from(err: &ServiceError) -> Self {
        let details = match err {
            ServiceError::Validation(validation) => serde_json::to_value(validation).ok(),
            ServiceError::DuplicateKey(key) | ServiceError::NotFound(key) => {
                serde_json::to_value(key).ok()
            }
            ServiceError::Storage(message) => Some(Value::String(message.clone())),
            ServiceError::Transport(_) => None,
        };
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl Response {
    pub fn ok(id: &str, result: Value) -> Self {
        Self {
            id: id.to_string(),
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: &str, error: WireError) -> Self {
        Self {
            id: id.to_string(),
            ok: false,
            result: None,
            error: Some(error),
        }
    }

    /// Splits the envelope into the call outcome.
    pub fn into_result(self) -> Result<Value, WireError> {
        match (self.ok, self.result, self.error) {
            (true, result, _) => Ok(result.unwrap_or(Value::Null)),
            (false, _, Some(error)) => Err(error),
            (false, _, None) => Err(WireError::new(
                "transport",
                "error response without error body",
            )),
        }
    }
}

/// Decodes typed params, mapping failures to `bad_request`.
pub fn decode_params<T: DeserializeOwned>(params: Value) -> Result<T, WireError> {
    serde_json::from_value(params)
        .map_err(|err| WireError::bad_request(format!("invalid params: {err}")))
}

/// Encodes a service result, mapping failures to wire errors.
pub fn encode_result<T: Serialize>(result: Result<T, ServiceError>) -> Result<Value, WireError> {
    match result {
        Ok(value) => serde_json::to_value(value)
            .map_err(|err| WireError::new("storage", format!("cannot encode result: {err}"))),
        Err(err) => Err(WireError::from(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::{Response, WireError};
    use gradebook_core::{EntityKey, ServiceError, ValidationError};
    use serde_json::json;

    #[test]
    fn business_errors_survive_the_wire() {
        let errors = [
            ServiceError::Validation(ValidationError::NonPositiveCredits { value: -1 }),
            ServiceError::DuplicateKey(EntityKey::student("SV01")),
            ServiceError::NotFound(EntityKey::Score {
                msv: "SV01".to_string(),
                ma_mon: "MH01".to_string(),
            }),
            ServiceError::Storage("disk full".to_string()),
        ];

        for original in errors {
            let line = serde_json::to_string(&WireError::from(&original)).unwrap();
            let decoded: WireError = serde_json::from_str(&line).unwrap();
            assert_eq!(decoded.message, original.to_string());
            assert_eq!(decoded.into_service_error(), original);
        }
    }

    #[test]
    fn transport_codes_become_transport_errors() {
        let err = WireError::new("service_not_bound", "no service bound as `X`");
        assert!(matches!(
            err.into_service_error(),
            ServiceError::Transport(message) if message.contains("service_not_bound")
        ));

        let missing_details = WireError::new("not_found", "student `SV01` not found");
        assert!(matches!(
            missing_details.into_service_error(),
            ServiceError::Transport(_)
        ));
    }

    #[test]
    fn response_envelope_uses_ok_flag() {
        let ok = Response::ok("1", json!([1, 2]));
        let line = serde_json::to_value(&ok).unwrap();
        assert_eq!(line, json!({"id": "1", "ok": true, "result": [1, 2]}));
        assert_eq!(ok.into_result().unwrap(), json!([1, 2]));

        let err = Response::err("2", WireError::bad_request("bad"));
        let line = serde_json::to_value(&err).unwrap();
        assert_eq!(line["ok"], false);
        assert_eq!(line["error"]["code"], "bad_request");
        assert!(err.into_result().is_err());
    }
}
