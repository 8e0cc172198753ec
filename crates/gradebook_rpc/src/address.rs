//! Service locator addresses of the form `gradebook://host[:port]/<Name>`.

use crate::protocol::{DEFAULT_PORT, URL_SCHEME};
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

/// Address parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    InvalidUrl { input: String, reason: String },
    UnsupportedScheme(String),
    MissingHost(String),
}

impl Display for LocatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl { input, reason } => write!(f, "invalid endpoint `{input}`: {reason}"),
            Self::UnsupportedScheme(scheme) => {
                write!(f, "unsupported scheme `{scheme}`, expected `{URL_SCHEME}`")
            }
            Self::MissingHost(input) => write!(f, "endpoint `{input}` has no host"),
        }
    }
}

impl Error for LocatorError {}

/// Host endpoint plus an optional bound service name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrl {
    pub host: String,
    pub port: u16,
    pub name: Option<String>,
}

impl ServiceUrl {
    /// Parses `gradebook://host[:port][/Name]`.
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        let trimmed = input.trim();
        let url = Url::parse(trimmed).map_err(|err| LocatorError::InvalidUrl {
            input: trimmed.to_string(),
            reason: err.to_string(),
        })?;
        if url.scheme() != URL_SCHEME {
            return Err(LocatorError::UnsupportedScheme(url.scheme().to_string()));
        }
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| LocatorError::MissingHost(trimmed.to_string()))?
            .to_string();
        let name = url
            .path_segments()
            .and_then(|mut segments| segments.find(|segment| !segment.is_empty()))
            .map(str::to_string);

        Ok(Self {
            host,
            port: url.port().unwrap_or(DEFAULT_PORT),
            name,
        })
    }

    /// Returns the same host address naming another service.
    pub fn with_name(&self, name: &str) -> Self {
        Self {
            host: self.host.clone(),
            port: self.port,
            name: Some(name.to_string()),
        }
    }

    /// `host:port` suitable for `TcpStream::connect`.
    pub fn socket_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Display for ServiceUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{URL_SCHEME}://{}", self.socket_addr())?;
        if let Some(name) = &self.name {
            write!(f, "/{name}")?;
        }
        Ok(())
    }
}
