//! TCP host publishing a `ServiceRegistry`.
//!
//! # Invariants
//! - Each connection is served on its own thread; requests on one
//!   connection are answered in order.
//! - A line that is not a valid request is answered with `bad_request`
//!   and an empty id; the connection stays open.

use crate::protocol::{Request, Response, WireError};
use crate::registry::ServiceRegistry;
use log::{debug, info, warn};
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;

/// Bound listener plus the registry it serves.
pub struct Server {
    listener: TcpListener,
    registry: Arc<ServiceRegistry>,
}

impl Server {
    /// Binds the listener. Port 0 asks the OS for a free port.
    pub fn bind(addr: impl ToSocketAddrs, registry: ServiceRegistry) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        let local = listener.local_addr()?;
        info!(
            "event=host_start module=rpc status=ok addr={local} services={}",
            registry.names().join(",")
        );
        Ok(Self {
            listener,
            registry: Arc::new(registry),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the listener fails.
    pub fn serve(self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let registry = Arc::clone(&self.registry);
                    thread::spawn(move || serve_connection(stream, &registry));
                }
                Err(err) => warn!("event=connection_accept module=rpc status=error error={err}"),
            }
        }
        Ok(())
    }

    /// Serves on a background thread and returns the bound address.
    pub fn spawn(self) -> io::Result<SocketAddr> {
        let addr = self.local_addr()?;
        thread::spawn(move || {
            if let Err(err) = self.serve() {
                warn!("event=host_stop module=rpc status=error error={err}");
            }
        });
        Ok(addr)
    }
}

fn serve_connection(stream: TcpStream, registry: &ServiceRegistry) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    debug!("event=connection_open module=rpc peer={peer}");

    let outcome = answer_lines(stream, registry);
    match outcome {
        Ok(served) => debug!("event=connection_close module=rpc peer={peer} requests={served}"),
        Err(err) => {
            warn!("event=connection_close module=rpc status=error peer={peer} error={err}")
        }
    }
}

fn answer_lines(stream: TcpStream, registry: &ServiceRegistry) -> io::Result<usize> {
    let mut writer = stream.try_clone()?;
    let reader = BufReader::new(stream);
    let mut served = 0usize;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                debug!(
                    "event=request module=rpc service={} method={}",
                    request.service, request.method
                );
                registry.dispatch(request)
            }
            Err(err) => Response::err("", WireError::bad_request(format!("bad json: {err}"))),
        };
        let encoded = serde_json::to_string(&response).map_err(io::Error::other)?;
        writeln!(writer, "{encoded}")?;
        writer.flush()?;
        served += 1;
    }
    Ok(served)
}
