//! Host-side binding of service names to endpoints.
//!
//! # Invariants
//! - A name is bound at most once; rebinding is rejected.
//! - Names are ASCII alphanumeric (plus `_`), matching the last path segment
//!   of a `gradebook://host:port/<Name>` URL.

use crate::dispatch::{ScoreEndpoint, StudentEndpoint, SubjectEndpoint};
use crate::protocol::{
    Request, Response, WireError, CODE_SERVICE_NOT_BOUND, CODE_UNKNOWN_METHOD, REGISTRY_SERVICE,
    SCORE_SERVICE, STUDENT_SERVICE, SUBJECT_SERVICE,
};
use gradebook_core::Services;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// One remotely callable service.
pub trait ServiceEndpoint: Send + Sync {
    /// Executes `method` with JSON params and returns the JSON result.
    fn call(&self, method: &str, params: Value) -> Result<Value, WireError>;
}

/// Binding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidName(String),
    AlreadyBound(String),
    NotBound(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "service name is invalid: `{name}`"),
            Self::AlreadyBound(name) => write!(f, "service already bound: `{name}`"),
            Self::NotBound(name) => write!(f, "no service bound as `{name}`"),
        }
    }
}

impl Error for RegistryError {}

/// Name → endpoint table served by one host.
#[derive(Default)]
pub struct ServiceRegistry {
    endpoints: BTreeMap<String, Arc<dyn ServiceEndpoint>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the three record services under their standard names.
    pub fn with_services(services: &Services) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.bind(
            STUDENT_SERVICE,
            Arc::new(StudentEndpoint::new(services.students.clone())),
        )?;
        registry.bind(
            SUBJECT_SERVICE,
            Arc::new(SubjectEndpoint::new(services.subjects.clone())),
        )?;
        registry.bind(
            SCORE_SERVICE,
            Arc::new(ScoreEndpoint::new(services.scores.clone())),
        )?;
        Ok(registry)
    }

    /// Binds one endpoint under `name`.
    pub fn bind(
        &mut self,
        name: &str,
        endpoint: Arc<dyn ServiceEndpoint>,
    ) -> Result<(), RegistryError> {
        let name = name.trim();
        if !is_valid_service_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.endpoints.contains_key(name) {
            return Err(RegistryError::AlreadyBound(name.to_string()));
        }
        self.endpoints.insert(name.to_string(), endpoint);
        Ok(())
    }

    /// Resolves one bound endpoint; surrounding whitespace is ignored as in `bind`.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn ServiceEndpoint>, RegistryError> {
        let name = name.trim();
        self.endpoints
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotBound(name.to_string()))
    }

    /// Returns bound names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.endpoints.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Routes one request to its endpoint and wraps the outcome.
    pub fn dispatch(&self, request: Request) -> Response {
        let outcome = if request.service.trim() == REGISTRY_SERVICE {
            self.call_registry(&request.method, request.params)
        } else {
            self.lookup(&request.service)
                .map_err(|err| WireError::new(CODE_SERVICE_NOT_BOUND, err.to_string()))
                .and_then(|endpoint| endpoint.call(&request.method, request.params))
        };

        match outcome {
            Ok(result) => Response::ok(&request.id, result),
            Err(error) => Response::err(&request.id, error),
        }
    }

    fn call_registry(&self, method: &str, params: Value) -> Result<Value, WireError> {
        #[derive(Deserialize)]
        struct LookupParams {
            name: String,
        }

        match method {
            "lookup" => {
                let params: LookupParams = crate::protocol::decode_params(params)?;
                self.lookup(&params.name)
                    .map(|_| json!({ "name": params.name, "bound": true }))
                    .map_err(|err| WireError::new(CODE_SERVICE_NOT_BOUND, err.to_string()))
            }
            "list" => Ok(json!(self.names())),
            other => Err(unknown_method(REGISTRY_SERVICE, other)),
        }
    }
}

pub(crate) fn unknown_method(service: &str, method: &str) -> WireError {
    WireError::new(
        CODE_UNKNOWN_METHOD,
        format!("unknown method `{method}` on `{service}`"),
    )
}

fn is_valid_service_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
