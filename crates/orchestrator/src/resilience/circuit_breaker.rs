//! Consecutive-failure circuit breaker.
//!
//! The breaker opens after `failure_threshold` consecutive transient failures
//! and rejects calls for `break_duration`. After that a single probe call is
//! admitted: success closes the breaker, failure reopens it. Outcomes of calls
//! admitted earlier that finish after the breaker opened only touch the
//! failure count.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::clients::{Dependency, DownstreamError};

/// Breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls flow normally.
    Closed,
    /// Calls are rejected without reaching the dependency.
    Open,
    /// One probe call decides whether to close or reopen.
    HalfOpen,
}

/// Breaker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before admitting a probe.
    pub break_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 4,
            break_duration: Duration::from_secs(120),
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Circuit breaker shared by every call to one dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    dependency: Dependency,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

/// Releases the half-open probe slot if the probe future is dropped early.
struct ProbeGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.inner.lock().probe_in_flight = false;
        }
    }
}

impl CircuitBreaker {
    pub fn new(dependency: Dependency, config: CircuitBreakerConfig) -> Self {
        Self {
            dependency,
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    pub fn dependency(&self) -> Dependency {
        self.dependency
    }

    pub fn config(&self) -> CircuitBreakerConfig {
        self.config
    }

    /// Current state. An open breaker whose break has elapsed still reports
    /// `Open` until the next call probes it.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.inner.lock().consecutive_failures
    }

    /// Runs `operation` if the breaker admits it and records the outcome.
    ///
    /// Returns [`DownstreamError::CircuitOpen`] without calling `operation`
    /// when the breaker rejects the call.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, DownstreamError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DownstreamError>>,
    {
        let is_probe = self.admit()?;
        let mut guard = ProbeGuard {
            breaker: self,
            armed: is_probe,
        };

        let result = operation().await;
        guard.armed = false;

        match &result {
            Ok(_) => self.record_success(is_probe),
            Err(err) if err.is_transient() => self.record_failure(err, is_probe),
            // The dependency answered; a rejected request says nothing about its health.
            Err(_) => self.record_success(is_probe),
        }
        result
    }

    /// Returns `Ok(true)` when the admitted call is the half-open probe.
    fn admit(&self) -> Result<bool, DownstreamError> {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => Ok(false),
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.config.break_duration)
                    .unwrap_or(true);
                if elapsed {
                    info!(dependency = %self.dependency, "circuit breaker half-open, probing");
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    Ok(true)
                } else {
                    Err(self.rejected())
                }
            }
            CircuitState::HalfOpen if !inner.probe_in_flight => {
                inner.probe_in_flight = true;
                Ok(true)
            }
            CircuitState::HalfOpen => Err(self.rejected()),
        }
    }

    fn rejected(&self) -> DownstreamError {
        metrics::counter!(
            "downstream_requests_total",
            "dependency" => self.dependency.as_str(),
            "outcome" => "rejected"
        )
        .increment(1);
        DownstreamError::CircuitOpen {
            dependency: self.dependency,
        }
    }

    fn record_success(&self, is_probe: bool) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures = 0;
        if !is_probe {
            return;
        }
        if inner.state == CircuitState::HalfOpen {
            info!(dependency = %self.dependency, "circuit breaker closed");
            inner.state = CircuitState::Closed;
            inner.opened_at = None;
        }
        inner.probe_in_flight = false;
    }

    fn record_failure(&self, err: &DownstreamError, is_probe: bool) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        if is_probe {
            inner.probe_in_flight = false;
        }

        let should_open = match inner.state {
            CircuitState::HalfOpen => is_probe,
            CircuitState::Closed => inner.consecutive_failures >= self.config.failure_threshold,
            CircuitState::Open => false,
        };
        if should_open {
            warn!(
                dependency = %self.dependency,
                failures = inner.consecutive_failures,
                break_secs = self.config.break_duration.as_secs(),
                error = %err,
                "circuit breaker opened"
            );
            metrics::counter!(
                "circuit_breaker_opened_total",
                "dependency" => self.dependency.as_str()
            )
            .increment(1);
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
        }
    }
}
