//! Readiness probing for newly started workload instances.
//!
//! An orchestrator must not route traffic to an instance until it has proven
//! itself reachable. This crate checks that by polling a declared probe
//! against the instance's endpoint:
//! - HTTP GET checks (ready on `200 OK` only)
//! - TCP connect checks
//!
//! # Features
//!
//! - Tagged ports: numeric or named, unknown tags are rejected
//! - Endpoint overlay: the endpoint's host and port always win over the spec
//! - Bounded polling with a fixed delay (60 attempts, 1s apart by default)
//! - Transport failures stop the cycle at once, only "not ready" is retried
//! - Cancellation through a [`CancellationToken`](tokio_util::sync::CancellationToken)
//!
//! # Example
//!
//! ```no_run
//! use readiness::{Endpoint, HttpGetSpec, PollPolicy, Poller, ProbeSpec};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = ProbeSpec::HttpGet(HttpGetSpec {
//!     path: "/healthz".to_string(),
//!     ..HttpGetSpec::default()
//! });
//! let endpoint = Endpoint::new("my-app.default.svc.cluster.local", 8080);
//!
//! let poller = Poller::new(PollPolicy::default())?;
//! let outcome = poller.poll(Some(&spec), &endpoint).await;
//!
//! if outcome.is_ready() {
//!     println!("ready after {} attempts", outcome.attempts);
//! }
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod error;
pub mod poller;
pub mod probers;
pub mod types;

pub use address::resolve_address;
pub use error::ProbeError;
pub use poller::{PollOutcome, PollPolicy, Poller, Termination};
pub use probers::{BoundProbe, HttpGetProber, Prober, ReadinessCheck, TcpSocketProber};
pub use types::{Endpoint, HttpGetSpec, Port, PortSpec, ProbeSpec, TcpSocketSpec};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_outcome_is_ready() {
        let outcome = PollOutcome {
            attempts: 3,
            termination: Termination::Ready,
        };
        assert!(outcome.is_ready());

        let outcome = PollOutcome {
            attempts: 60,
            termination: Termination::Exhausted,
        };
        assert!(!outcome.is_ready());
    }

    #[test]
    fn test_policy_serde() {
        let policy: PollPolicy =
            serde_json::from_str(r#"{"max_attempts": 5, "interval": "250ms"}"#).unwrap();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.interval, std::time::Duration::from_millis(250));
    }
}
