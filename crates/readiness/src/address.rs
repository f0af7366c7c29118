//! Address resolution for probe targets.

use crate::error::ProbeError;
use crate::types::{Port, PortSpec};
use std::net::Ipv6Addr;

/// Turn a host and a port into a dialable `host:port` string.
///
/// Named ports are passed through as the port token and left to the
/// transport to resolve. IPv6 literals are bracketed.
pub fn resolve_address(host: &str, port: &PortSpec) -> Result<String, ProbeError> {
    let host = if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{}]", host)
    } else {
        host.to_string()
    };

    match port.classify()? {
        Port::Numeric(number) => Ok(format!("{}:{}", host, number)),
        Port::Named(name) => Ok(format!("{}:{}", host, name)),
    }
}
