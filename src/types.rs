//! Type definitions shared across the pipeline

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use serde::{Deserialize, Serialize};
use url::Url;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// One host to be probed, optionally carrying its own port
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateAddress {
    /// IP literal or hostname, without brackets
    pub host: String,
    /// Port to dial
    pub port: u16,
    /// Whether the port came from the input line rather than the default
    pub explicit_port: bool,
}

impl CandidateAddress {
    /// Parse `host`, `ipv4:port`, `[ipv6]:port` or a bare IPv6 literal.
    pub fn parse(raw: &str, default_port: u16) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::parse("Empty candidate address"));
        }

        if let Ok(addr) = raw.parse::<SocketAddr>() {
            return Ok(Self::explicit(addr.ip().to_string(), addr.port()));
        }

        if let Ok(ip) = raw.parse::<IpAddr>() {
            return Ok(Self::with_default(ip.to_string(), default_port));
        }

        if let Some(inner) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let ip: IpAddr = inner.parse()?;
            return Ok(Self::with_default(ip.to_string(), default_port));
        }

        match raw.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && !host.contains(':') => {
                let port: u16 = port.parse()?;
                Ok(Self::explicit(host.to_string(), port))
            }
            Some(_) => Err(AppError::parse(format!("Invalid candidate address: {}", raw))),
            None => Ok(Self::with_default(raw.to_string(), default_port)),
        }
    }

    /// Candidate for one address of an expanded block
    pub fn from_ip(ip: IpAddr, default_port: u16) -> Self {
        Self::with_default(ip.to_string(), default_port)
    }

    fn explicit(host: String, port: u16) -> Self {
        Self { host, port, explicit_port: true }
    }

    fn with_default(host: String, port: u16) -> Self {
        Self { host, port, explicit_port: false }
    }

    /// Target for `TcpStream::connect` and `lookup_host`
    pub fn socket_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl fmt::Display for CandidateAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// A fixed HTTP resource requested from every candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub url: Url,
    /// Value for SNI and the `Host` header
    pub host: String,
    /// Request target, e.g. `/cdn-cgi/trace`
    pub path_and_query: String,
    pub tls: bool,
}

impl Endpoint {
    /// Build an endpoint from a scheme-less `host/path` location.
    ///
    /// The scheme follows the TLS flag. A location that already carries a
    /// scheme is accepted as long as it agrees with the flag.
    pub fn parse(location: &str, tls: bool) -> Result<Self> {
        let scheme = if tls { "https" } else { "http" };
        let location = location.trim();
        let full = if location.contains("://") {
            location.to_string()
        } else {
            format!("{}://{}", scheme, location)
        };

        let url = Url::parse(&full)?;
        if url.scheme() != scheme {
            return Err(AppError::config(format!(
                "Endpoint {} does not match TLS setting (expected {})",
                location, scheme
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| AppError::config(format!("Endpoint has no host: {}", location)))?
            .to_string();

        let mut path_and_query = url.path().to_string();
        if let Some(query) = url.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        Ok(Self { url, host, path_and_query, tls })
    }
}
