//! Probe error types.

use std::error::Error as StdError;
use std::fmt::Write as _;

/// Errors raised while resolving or executing a single probe.
///
/// Every variant is fatal to the polling cycle that observed it. A check that
/// simply is not ready yet is reported as `Ok(false)`, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// No probe specification was supplied.
    #[error("probe cannot be nil")]
    InvalidSpec,

    /// The port tag is neither numeric nor named.
    #[error("unsupported port type {0}")]
    UnsupportedPortType(i32),

    /// The declared scheme cannot be probed.
    #[error("unsupported probe scheme {0:?}")]
    UnsupportedScheme(String),

    /// The host and port could not be turned into a dialable target.
    #[error("cannot resolve probe target {address}: {reason}")]
    Resolution { address: String, reason: String },

    /// The network operation itself failed.
    #[error("probe of {address} failed: {reason}")]
    Transport { address: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("cannot build HTTP client: {0}")]
    Client(String),

    /// The polling policy cannot drive a cycle.
    #[error("invalid poll policy: {0}")]
    InvalidPolicy(String),
}

impl ProbeError {
    /// Build a transport error from any error, keeping its full source chain.
    pub fn transport(address: impl Into<String>, err: &(dyn StdError + 'static)) -> Self {
        ProbeError::Transport {
            address: address.into(),
            reason: error_chain(err),
        }
    }

    /// Returns true if the failure happened on the wire rather than in the spec.
    pub fn is_transport(&self) -> bool {
        matches!(self, ProbeError::Transport { .. })
    }
}

/// Flatten an error and its sources into one line.
///
/// reqwest reports DNS and connect failures only in the source chain.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            let _ = write!(out, ": {}", text);
        }
        source = cause.source();
    }
    out
}
