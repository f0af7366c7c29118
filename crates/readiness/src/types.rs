//! Probe specification types.

use crate::error::ProbeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A port given either as a number or as a named (service) port.
///
/// The tag is kept open so a declarative source can hand over a value this
/// crate does not understand; such a port fails resolution with
/// [`ProbeError::UnsupportedPortType`] instead of being defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PortRepr")]
pub struct PortSpec {
    /// Variant tag, see [`PortSpec::NUMERIC`] and [`PortSpec::NAMED`]
    #[serde(rename = "type")]
    pub kind: i32,

    /// Port number, used when `kind` is numeric
    pub int_val: i32,

    /// Port name, used when `kind` is named
    pub str_val: String,
}

/// Classified view of a [`PortSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port<'a> {
    Numeric(i32),
    Named(&'a str),
}

impl PortSpec {
    /// Tag of a numeric port
    pub const NUMERIC: i32 = 0;
    /// Tag of a named port
    pub const NAMED: i32 = 1;

    /// Create a numeric port
    pub fn numeric(port: i32) -> Self {
        Self {
            kind: Self::NUMERIC,
            int_val: port,
            str_val: String::new(),
        }
    }

    /// Create a named port
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: Self::NAMED,
            int_val: 0,
            str_val: name.into(),
        }
    }

    /// Classify the port by its tag.
    pub fn classify(&self) -> Result<Port<'_>, ProbeError> {
        match self.kind {
            Self::NUMERIC => Ok(Port::Numeric(self.int_val)),
            Self::NAMED => Ok(Port::Named(&self.str_val)),
            other => Err(ProbeError::UnsupportedPortType(other)),
        }
    }
}

impl Default for PortSpec {
    fn default() -> Self {
        Self::numeric(0)
    }
}

impl From<i32> for PortSpec {
    fn from(port: i32) -> Self {
        Self::numeric(port)
    }
}

impl From<&str> for PortSpec {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

/// Accepted YAML/JSON shapes for a port: `8080`, `"http"` or the tagged form.
#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Numeric(i32),
    Named(String),
    Tagged {
        #[serde(rename = "type")]
        kind: i32,
        #[serde(default)]
        int_val: i32,
        #[serde(default)]
        str_val: String,
    },
}

impl From<PortRepr> for PortSpec {
    fn from(repr: PortRepr) -> Self {
        match repr {
            PortRepr::Numeric(port) => Self::numeric(port),
            PortRepr::Named(name) => Self::named(name),
            PortRepr::Tagged {
                kind,
                int_val,
                str_val,
            } => Self {
                kind,
                int_val,
                str_val,
            },
        }
    }
}

/// HTTP GET readiness check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpGetSpec {
    /// Host to connect to
    #[serde(default)]
    pub host: String,

    /// Port to connect to
    #[serde(default)]
    pub port: PortSpec,

    /// Request path
    #[serde(default)]
    pub path: String,

    /// URL scheme, empty means http
    #[serde(default)]
    pub scheme: String,
}

/// TCP connect readiness check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpSocketSpec {
    /// Host to connect to
    #[serde(default)]
    pub host: String,

    /// Port to connect to
    #[serde(default)]
    pub port: PortSpec,
}

/// Declared readiness check of a workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbeSpec {
    /// Check with an HTTP GET request
    HttpGet(HttpGetSpec),

    /// Check by opening a TCP connection
    TcpSocket(TcpSocketSpec),
}

impl ProbeSpec {
    /// Short name of the probe kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeSpec::HttpGet(_) => "http_get",
            ProbeSpec::TcpSocket(_) => "tcp_socket",
        }
    }

    /// Copy of this spec aimed at `endpoint`.
    ///
    /// The endpoint's host and numeric port replace whatever the spec
    /// declared; path and scheme are kept.
    pub fn with_endpoint(&self, endpoint: &Endpoint) -> ProbeSpec {
        match self {
            ProbeSpec::HttpGet(spec) => ProbeSpec::HttpGet(HttpGetSpec {
                host: endpoint.fqdn.clone(),
                port: PortSpec::numeric(endpoint.port),
                ..spec.clone()
            }),
            ProbeSpec::TcpSocket(_) => ProbeSpec::TcpSocket(TcpSocketSpec {
                host: endpoint.fqdn.clone(),
                port: PortSpec::numeric(endpoint.port),
            }),
        }
    }
}

/// Network location whose readiness is checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Fully qualified domain name or IP address
    pub fqdn: String,

    /// Port number
    pub port: i32,
}

impl Endpoint {
    pub fn new(fqdn: impl Into<String>, port: i32) -> Self {
        Self {
            fqdn: fqdn.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.fqdn, self.port)
    }
}
