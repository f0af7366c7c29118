//! Readiness check runner
//!
//! Loads a probe, an endpoint and a polling policy from YAML, runs one
//! polling cycle and turns the outcome into a process exit code. Useful as an
//! init step or a deployment gate in front of an instance that must not get
//! traffic before it answers its readiness probe.

pub mod config;

pub use config::Config;

use readiness::{PollOutcome, Poller, Termination};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Exit code when the endpoint became ready
pub const EXIT_READY: u8 = 0;
/// Exit code when the endpoint never became ready or the check failed
pub const EXIT_NOT_READY: u8 = 1;
/// Exit code for configuration and setup errors
pub const EXIT_CONFIG: u8 = 2;

/// Run one polling cycle as described by `config`.
pub async fn run(config: &Config, cancel: CancellationToken) -> common::Result<PollOutcome> {
    let poller = Poller::new(config.poll_policy()).map_err(common::Error::probe)?;
    let endpoint = config.endpoint();

    info!(
        endpoint = %endpoint,
        probe = config.probe.as_ref().map_or("none", |p| p.kind()),
        max_attempts = poller.policy().max_attempts,
        "checking readiness"
    );

    let outcome = poller
        .poll_until_cancelled(config.probe.as_ref(), &endpoint, cancel)
        .await;

    match &outcome.termination {
        Termination::Ready => info!(attempts = outcome.attempts, "endpoint is ready"),
        Termination::Exhausted => {
            warn!(attempts = outcome.attempts, "endpoint never became ready")
        }
        Termination::Failed(err) => {
            warn!(attempts = outcome.attempts, error = %err, "readiness check failed")
        }
        Termination::Cancelled => warn!(attempts = outcome.attempts, "readiness check cancelled"),
    }

    Ok(outcome)
}

/// Map a polling outcome to a process exit code.
pub fn exit_code(outcome: &PollOutcome) -> u8 {
    if outcome.is_ready() {
        EXIT_READY
    } else {
        EXIT_NOT_READY
    }
}
