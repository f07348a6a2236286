// ABOUTME: Port specification parsing for container definitions.
// ABOUTME: Turns "[hostIp:]hostPort:containerPort[/proto]" into a PortMapping.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortSpecError {
    #[error("port specification cannot be empty")]
    Empty,

    #[error("missing container port in '{0}'")]
    MissingContainerPort(String),

    #[error("invalid port '{port}' in '{spec}'")]
    InvalidPort { spec: String, port: String },

    #[error("unknown protocol '{protocol}' in '{spec}'")]
    UnknownProtocol { spec: String, protocol: String },
}

/// Network protocol of a published port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Sctp => write!(f, "sctp"),
        }
    }
}

/// One published port of a container.
///
/// `host_ip` and `host_port` stay `None` when the spec did not name them;
/// they are never stored as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortMapping {
    container_port: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    host_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host_port: Option<String>,
    protocol: Protocol,
}

impl PortMapping {
    /// Parse a port spec, splitting on `:` from the right.
    ///
    /// - `"3000"` → container port only
    /// - `"8000:80"` → host port and container port
    /// - `"127.0.0.1:8000:80"` → host ip, host port and container port
    ///
    /// A trailing `/tcp`, `/udp` or `/sctp` (any case) selects the protocol.
    pub fn parse(spec: &str) -> Result<Self, PortSpecError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(PortSpecError::Empty);
        }

        let (address, protocol) = match spec.rsplit_once('/') {
            Some((address, protocol)) => match protocol.to_ascii_lowercase().as_str() {
                "tcp" => (address, Protocol::Tcp),
                "udp" => (address, Protocol::Udp),
                "sctp" => (address, Protocol::Sctp),
                _ => {
                    return Err(PortSpecError::UnknownProtocol {
                        spec: spec.to_string(),
                        protocol: protocol.to_string(),
                    });
                }
            },
            None => (spec, Protocol::Tcp),
        };

        // The remainder after two splits is the host ip, so IPv6 hosts survive.
        let mut parts = address.rsplitn(3, ':');

        let container_port = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| PortSpecError::MissingContainerPort(spec.to_string()))?;
        validate_port(spec, container_port)?;

        let host_port = non_empty(parts.next());
        if let Some(port) = host_port {
            validate_port(spec, port)?;
        }

        let host_ip = non_empty(parts.next());

        Ok(Self {
            container_port: container_port.to_string(),
            host_ip: host_ip.map(str::to_string),
            host_port: host_port.map(str::to_string),
            protocol,
        })
    }

    pub fn container_port(&self) -> &str {
        &self.container_port
    }

    pub fn host_ip(&self) -> Option<&str> {
        self.host_ip.as_deref()
    }

    pub fn host_port(&self) -> Option<&str> {
        self.host_port.as_deref()
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Key the runtime uses for exposed ports and bindings, e.g. `8000/tcp`.
    pub fn port_key(&self) -> String {
        format!("{}/{}", self.container_port, self.protocol)
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref ip) = self.host_ip {
            write!(f, "{}:", ip)?;
        }
        if let Some(ref port) = self.host_port {
            write!(f, "{}:", port)?;
        }
        write!(f, "{}", self.port_key())
    }
}

fn non_empty(part: Option<&str>) -> Option<&str> {
    part.filter(|p| !p.is_empty())
}

/// A port is a number in 1..=65535 or a `low-high` range of such numbers.
fn validate_port(spec: &str, port: &str) -> Result<(), PortSpecError> {
    let invalid = || PortSpecError::InvalidPort {
        spec: spec.to_string(),
        port: port.to_string(),
    };

    let parse = |value: &str| value.parse::<u16>().ok().filter(|p| *p > 0);

    match port.split_once('-') {
        Some((low, high)) => match (parse(low), parse(high)) {
            (Some(low), Some(high)) if low <= high => Ok(()),
            _ => Err(invalid()),
        },
        None => parse(port).map(|_| ()).ok_or_else(invalid),
    }
}
