//! Remote-call layer for the gradebook record services.
//!
//! A host binds `StudentService`, `SubjectService` and `ScoreService` under
//! their names and serves line-delimited JSON over TCP. Clients resolve the
//! names from a `gradebook://host:port` endpoint and get handles that
//! implement the same service traits as the in-process services.

pub mod address;
pub mod client;
mod dispatch;
pub mod protocol;
pub mod registry;
pub mod server;

pub use address::{LocatorError, ServiceUrl};
pub use client::{
    RemoteScoreService, RemoteStudentService, RemoteSubjectService, RpcConnection, ServiceLocator,
};
pub use dispatch::{ScoreEndpoint, StudentEndpoint, SubjectEndpoint};
pub use protocol::{Request, Response, WireError, DEFAULT_PORT};
pub use registry::{RegistryError, ServiceEndpoint, ServiceRegistry};
pub use server::Server;
