//! Client-side service handles resolved by name from a remote host.
//!
//! # Responsibility
//! - Resolve `StudentService`, `SubjectService` and `ScoreService` from a
//!   `gradebook://host:port` endpoint.
//! - Expose remote handles through the same traits as local services, so
//!   callers cannot tell them apart.
//!
//! # Invariants
//! - Business errors come back as the variant the host produced.
//! - Connection, framing and binding failures surface as
//!   `ServiceError::Transport`.

use crate::address::{LocatorError, ServiceUrl};
use crate::protocol::{
    Request, Response, REGISTRY_SERVICE, SCORE_SERVICE, STUDENT_SERVICE, SUBJECT_SERVICE,
};
use gradebook_core::{
    Score, ScoreId, ScoreService, ServiceError, ServiceResult, Services, Student, StudentService,
    Subject, SubjectService,
};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

struct Channel {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    /// Set once a call leaves the stream out of step with its replies.
    broken: Option<String>,
}

impl Channel {
    fn exchange(&mut self, line: &str, endpoint: &ServiceUrl) -> ServiceResult<String> {
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|err| format!("send to {endpoint} failed: {err}"))
            .and_then(|()| {
                let mut reply = String::new();
                match self.reader.read_line(&mut reply) {
                    Ok(0) => Err(format!("{endpoint} closed the connection")),
                    Ok(_) => Ok(reply),
                    Err(err) => Err(format!("receive from {endpoint} failed: {err}")),
                }
            })
            .map_err(|reason| self.poison(reason))
    }

    fn poison(&mut self, reason: String) -> ServiceError {
        self.broken = Some(reason.clone());
        transport(reason)
    }
}

/// One framed connection to a host; calls are serialized over it.
///
/// Calls block until the host answers. After a send, receive or framing
/// failure every later call fails fast with `Transport`.
pub struct RpcConnection {
    endpoint: ServiceUrl,
    channel: Mutex<Channel>,
}

impl RpcConnection {
    /// Opens a connection to the host named by `endpoint`.
    pub fn connect(endpoint: &ServiceUrl) -> ServiceResult<Self> {
        let addr = endpoint.socket_addr();
        let candidates = addr
            .to_socket_addrs()
            .map_err(|err| transport(format!("cannot resolve `{addr}`: {err}")))?;

        let mut last_error = None;
        for candidate in candidates {
            match TcpStream::connect_timeout(&candidate, CONNECT_TIMEOUT) {
                Ok(stream) => return Self::from_stream(endpoint, stream),
                Err(err) => last_error = Some(err),
            }
        }
        Err(transport(match last_error {
            Some(err) => format!("cannot connect to `{addr}`: {err}"),
            None => format!("`{addr}` resolved to no addresses"),
        }))
    }

    fn from_stream(endpoint: &ServiceUrl, stream: TcpStream) -> ServiceResult<Self> {
        let writer = stream
            .try_clone()
            .map_err(|err| transport(format!("socket setup failed: {err}")))?;
        debug!("event=client_connect module=rpc endpoint={endpoint}");
        Ok(Self {
            endpoint: endpoint.clone(),
            channel: Mutex::new(Channel {
                reader: BufReader::new(stream),
                writer,
                broken: None,
            }),
        })
    }

    /// Sends one request and waits for the matching response.
    pub fn call(&self, service: &str, method: &str, params: Value) -> ServiceResult<Value> {
        let request = Request {
            id: Uuid::new_v4().to_string(),
            service: service.to_string(),
            method: method.to_string(),
            params,
        };
        let line = serde_json::to_string(&request)
            .map_err(|err| transport(format!("cannot encode request: {err}")))?;

        let mut channel = self
            .channel
            .lock()
            .map_err(|_| transport("connection lock poisoned"))?;
        if let Some(reason) = &channel.broken {
            return Err(transport(format!(
                "connection to {} is unusable: {reason}",
                self.endpoint
            )));
        }

        let reply = channel.exchange(&line, &self.endpoint)?;
        let response: Response = match serde_json::from_str(reply.trim_end()) {
            Ok(response) => response,
            Err(err) => return Err(channel.poison(format!("malformed response: {err}"))),
        };
        if response.id != request.id {
            return Err(channel.poison(format!(
                "response id `{}` does not match request `{}`",
                response.id, request.id
            )));
        }
        drop(channel);

        response
            .into_result()
            .map_err(|error| error.into_service_error())
    }

    fn call_typed<T: DeserializeOwned>(
        &self,
        service: &str,
        method: &str,
        params: Value,
    ) -> ServiceResult<T> {
        let value = self.call(service, method, params)?;
        serde_json::from_value(value)
            .map_err(|err| transport(format!("malformed `{service}.{method}` result: {err}")))
    }
}

/// Resolves named services published by one host.
pub struct ServiceLocator {
    endpoint: ServiceUrl,
}

impl ServiceLocator {
    /// Accepts `gradebook://host[:port]`; a trailing service name is ignored.
    pub fn new(endpoint: &str) -> Result<Self, LocatorError> {
        let mut endpoint = ServiceUrl::parse(endpoint)?;
        endpoint.name = None;
        Ok(Self { endpoint })
    }

    pub fn endpoint(&self) -> &ServiceUrl {
        &self.endpoint
    }

    pub fn lookup_students(&self) -> ServiceResult<RemoteStudentService> {
        let connection = self.bound(STUDENT_SERVICE)?;
        Ok(RemoteStudentService { connection })
    }

    pub fn lookup_subjects(&self) -> ServiceResult<RemoteSubjectService> {
        let connection = self.bound(SUBJECT_SERVICE)?;
        Ok(RemoteSubjectService { connection })
    }

    pub fn lookup_scores(&self) -> ServiceResult<RemoteScoreService> {
        let connection = self.bound(SCORE_SERVICE)?;
        Ok(RemoteScoreService { connection })
    }

    /// Resolves all three services over one shared connection.
    pub fn resolve_all(&self) -> ServiceResult<Services> {
        let connection = Arc::new(RpcConnection::connect(&self.endpoint)?);
        for name in [STUDENT_SERVICE, SUBJECT_SERVICE, SCORE_SERVICE] {
            ensure_bound(&connection, name)?;
        }
        Ok(Services {
            students: Arc::new(RemoteStudentService {
                connection: Arc::clone(&connection),
            }),
            subjects: Arc::new(RemoteSubjectService {
                connection: Arc::clone(&connection),
            }),
            scores: Arc::new(RemoteScoreService { connection }),
        })
    }

    /// Lists the names bound on the host.
    pub fn list(&self) -> ServiceResult<Vec<String>> {
        RpcConnection::connect(&self.endpoint)?.call_typed(REGISTRY_SERVICE, "list", Value::Null)
    }

    fn bound(&self, name: &str) -> ServiceResult<Arc<RpcConnection>> {
        let connection = RpcConnection::connect(&self.endpoint.with_name(name))?;
        ensure_bound(&connection, name)?;
        Ok(Arc::new(connection))
    }
}

fn ensure_bound(connection: &RpcConnection, name: &str) -> ServiceResult<()> {
    connection
        .call(REGISTRY_SERVICE, "lookup", json!({ "name": name }))
        .map(|_| ())
}

fn transport(message: impl Into<String>) -> ServiceError {
    ServiceError::Transport(message.into())
}

fn to_params<T: Serialize>(value: &T) -> ServiceResult<Value> {
    serde_json::to_value(value).map_err(|err| transport(format!("cannot encode params: {err}")))
}

/// `StudentService` proxied to a remote host.
pub struct RemoteStudentService {
    connection: Arc<RpcConnection>,
}

impl StudentService for RemoteStudentService {
    fn add(&self, student: &Student) -> ServiceResult<Student> {
        student.validate()?;
        self.connection
            .call_typed(STUDENT_SERVICE, "add", to_params(student)?)
    }

    fn update(&self, student: &Student) -> ServiceResult<Student> {
        student.validate()?;
        self.connection
            .call_typed(STUDENT_SERVICE, "update", to_params(student)?)
    }

    fn delete(&self, msv: &str) -> ServiceResult<()> {
        self.connection
            .call_typed(STUDENT_SERVICE, "delete", json!({ "msv": msv }))
    }

    fn find_by_id(&self, msv: &str) -> ServiceResult<Option<Student>> {
        self.connection
            .call_typed(STUDENT_SERVICE, "findById", json!({ "msv": msv }))
    }

    fn get_all(&self) -> ServiceResult<Vec<Student>> {
        self.connection
            .call_typed(STUDENT_SERVICE, "getAll", Value::Null)
    }
}

/// `SubjectService` proxied to a remote host.
pub struct RemoteSubjectService {
    connection: Arc<RpcConnection>,
}

impl SubjectService for RemoteSubjectService {
    fn add(&self, subject: &Subject) -> ServiceResult<Subject> {
        subject.validate()?;
        self.connection
            .call_typed(SUBJECT_SERVICE, "add", to_params(subject)?)
    }

    fn update(&self, subject: &Subject) -> ServiceResult<Subject> {
        subject.validate()?;
        self.connection
            .call_typed(SUBJECT_SERVICE, "update", to_params(subject)?)
    }

    fn delete(&self, ma_mon: &str) -> ServiceResult<()> {
        self.connection
            .call_typed(SUBJECT_SERVICE, "delete", json!({ "maMon": ma_mon }))
    }

    fn find_by_id(&self, ma_mon: &str) -> ServiceResult<Option<Subject>> {
        self.connection
            .call_typed(SUBJECT_SERVICE, "findById", json!({ "maMon": ma_mon }))
    }

    fn get_all(&self) -> ServiceResult<Vec<Subject>> {
        self.connection
            .call_typed(SUBJECT_SERVICE, "getAll", Value::Null)
    }
}

/// `ScoreService` proxied to a remote host.
pub struct RemoteScoreService {
    connection: Arc<RpcConnection>,
}

impl ScoreService for RemoteScoreService {
    fn add(&self, score: &Score) -> ServiceResult<Score> {
        score.validate()?;
        self.connection
            .call_typed(SCORE_SERVICE, "add", to_params(score)?)
    }

    fn update(&self, score: &Score) -> ServiceResult<Score> {
        score.validate()?;
        self.connection
            .call_typed(SCORE_SERVICE, "update", to_params(score)?)
    }

    fn delete(&self, msv: &str, ma_mon: &str) -> ServiceResult<()> {
        self.connection.call_typed(
            SCORE_SERVICE,
            "delete",
            json!({ "msv": msv, "maMon": ma_mon }),
        )
    }

    fn get_all(&self) -> ServiceResult<Vec<Score>> {
        self.connection
            .call_typed(SCORE_SERVICE, "getAll", Value::Null)
    }

    fn find_by_key(&self, msv: &str, ma_mon: &str) -> ServiceResult<Option<Score>> {
        self.connection.call_typed(
            SCORE_SERVICE,
            "findByKey",
            json!({ "msv": msv, "maMon": ma_mon }),
        )
    }

    fn find_by_id(&self, id: ScoreId) -> ServiceResult<Option<Score>> {
        self.connection
            .call_typed(SCORE_SERVICE, "findById", json!({ "id": id }))
    }

    fn list_by_student(&self, msv: &str) -> ServiceResult<Vec<Score>> {
        self.connection
            .call_typed(SCORE_SERVICE, "listByStudent", json!({ "msv": msv }))
    }
}
