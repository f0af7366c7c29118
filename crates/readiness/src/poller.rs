//! Readiness polling.
//!
//! A polling cycle checks one endpoint until it is ready, a check fails, the
//! attempt budget runs out or the caller cancels. Attempts run one after the
//! other in the calling task with a fixed delay in between.

use crate::error::ProbeError;
use crate::probers::{BoundProbe, HttpGetProber, Prober, ReadinessCheck, TcpSocketProber};
use crate::types::{Endpoint, ProbeSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Attempt budget and spacing of a polling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Maximum number of checks in one cycle
    pub max_attempts: u32,

    /// Delay between two checks
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl PollPolicy {
    /// Default number of attempts
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
    /// Default delay between attempts
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

/// Why a polling cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// A check reported ready
    Ready,
    /// Every attempt reported not ready
    Exhausted,
    /// A check failed; the cycle was not retried
    Failed(ProbeError),
    /// The caller cancelled the cycle
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Ready => write!(f, "READY"),
            Termination::Exhausted => write!(f, "EXHAUSTED"),
            Termination::Failed(err) => write!(f, "FAILED: {}", err),
            Termination::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Result of a polling cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Number of completed checks
    pub attempts: u32,

    /// Terminal reason
    pub termination: Termination,
}

impl PollOutcome {
    fn new(attempts: u32, termination: Termination) -> Self {
        Self {
            attempts,
            termination,
        }
    }

    /// Check if the endpoint became ready
    pub fn is_ready(&self) -> bool {
        self.termination == Termination::Ready
    }
}

/// Drives polling cycles with a fixed policy.
///
/// The poller holds no per-cycle state, so one instance can serve any number
/// of concurrent cycles against different endpoints.
#[derive(Debug, Clone)]
pub struct Poller {
    policy: PollPolicy,
    http: HttpGetProber,
    tcp: TcpSocketProber,
}

impl Poller {
    /// Create a new poller
    ///
    /// Fails if the policy allows no attempts.
    pub fn new(policy: PollPolicy) -> Result<Self, ProbeError> {
        if policy.max_attempts == 0 {
            return Err(ProbeError::InvalidPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            policy,
            http: HttpGetProber::new()?,
            tcp: TcpSocketProber::new(),
        })
    }

    /// Get the policy
    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Select the prober for `spec` and aim it at `endpoint`.
    pub fn bind(
        &self,
        spec: Option<&ProbeSpec>,
        endpoint: &Endpoint,
    ) -> Result<Box<dyn ReadinessCheck>, ProbeError> {
        let spec = spec.ok_or(ProbeError::InvalidSpec)?;

        let check: Box<dyn ReadinessCheck> = match spec.with_endpoint(endpoint) {
            ProbeSpec::HttpGet(http) => {
                debug!(prober = self.http.name(), endpoint = %endpoint, "binding probe");
                Box::new(BoundProbe::new(self.http.clone(), http))
            }
            ProbeSpec::TcpSocket(tcp) => {
                debug!(prober = self.tcp.name(), endpoint = %endpoint, "binding probe");
                Box::new(BoundProbe::new(self.tcp, tcp))
            }
        };
        Ok(check)
    }

    /// Poll `endpoint` until it is ready, a check fails or attempts run out.
    pub async fn poll(&self, spec: Option<&ProbeSpec>, endpoint: &Endpoint) -> PollOutcome {
        self.poll_until_cancelled(spec, endpoint, CancellationToken::new())
            .await
    }

    /// Like [`Poller::poll`], but stops early once `cancel` fires.
    pub async fn poll_until_cancelled(
        &self,
        spec: Option<&ProbeSpec>,
        endpoint: &Endpoint,
        cancel: CancellationToken,
    ) -> PollOutcome {
        let outcome = match self.bind(spec, endpoint) {
            Ok(check) => self.run(check.as_ref(), &cancel).await,
            Err(err) => {
                warn!(endpoint = %endpoint, error = %err, "cannot bind readiness probe");
                PollOutcome::new(0, Termination::Failed(err))
            }
        };

        info!(
            endpoint = %endpoint,
            attempts = outcome.attempts,
            outcome = %outcome.termination,
            "took {} probe attempts for readiness of endpoint {}",
            outcome.attempts,
            endpoint
        );
        outcome
    }

    /// Run one polling cycle over an already bound check.
    pub async fn run(&self, check: &dyn ReadinessCheck, cancel: &CancellationToken) -> PollOutcome {
        let mut attempt: u32 = 1;

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return PollOutcome::new(attempt - 1, Termination::Cancelled);
                }
                result = check.check() => result,
            };

            match result {
                Err(err) => {
                    warn!(attempt, error = %err, "error while checking probe");
                    return PollOutcome::new(attempt, Termination::Failed(err));
                }
                Ok(true) => return PollOutcome::new(attempt, Termination::Ready),
                Ok(false) if attempt >= self.policy.max_attempts => {
                    return PollOutcome::new(attempt, Termination::Exhausted);
                }
                Ok(false) => {
                    debug!(attempt, "endpoint not ready yet");
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            return PollOutcome::new(attempt, Termination::Cancelled);
                        }
                        _ = sleep(self.policy.interval) => {}
                    }
                    attempt += 1;
                }
            }
        }
    }
}
