//! Circuit breaker for provider calls
//!
//! - **Closed**: calls pass through; consecutive failures are counted
//! - **Open**: calls fail fast until the cool-down elapses
//! - **Half-Open**: trial calls decide between closing and reopening

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Thresholds of a circuit breaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Consecutive half-open successes that close it again
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
    /// Seconds the circuit stays open before trial calls
    #[serde(default = "default_open_secs")]
    pub open_secs: u64,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_success_threshold() -> u32 {
    1
}

const fn default_open_secs() -> u64 {
    30
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            success_threshold: default_success_threshold(),
            open_secs: default_open_secs(),
        }
    }
}

/// Observable state of a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through
    Closed,
    /// Calls fail fast
    Open,
    /// Trial calls allowed
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed { failures: u32 },
    Open { since: Instant },
    HalfOpen { successes: u32 },
}

/// Error of a call made through the breaker
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open; the provider was not called
    #[error("Circuit open for '{0}'")]
    Open(String),
    /// The provider call failed
    #[error(transparent)]
    Service(E),
}

/// Fails fast after repeated provider failures
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    phase: Mutex<Phase>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Create a breaker with default thresholds
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Create a breaker with custom thresholds
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            phase: Mutex::new(Phase::Closed { failures: 0 }),
        }
    }

    /// Name used in logs
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state; an expired open phase turns half-open here
    #[must_use]
    pub fn state(&self) -> CircuitState {
        let mut phase = self.phase.lock();
        if let Phase::Open { since } = *phase {
            if since.elapsed() >= Duration::from_secs(self.config.open_secs) {
                debug!(circuit = %self.name, "Circuit half-open, allowing trial calls");
                *phase = Phase::HalfOpen { successes: 0 };
            }
        }

        match *phase {
            Phase::Closed { .. } => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    /// Whether calls currently fail fast
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    /// Run `f` unless the circuit is open, recording its outcome
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if self.is_open() {
            debug!(circuit = %self.name, "Circuit open, call skipped");
            return Err(CircuitBreakerError::Open(self.name.clone()));
        }

        match f().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            },
            Err(e) => {
                self.record_failure();
                Err(CircuitBreakerError::Service(e))
            },
        }
    }

    fn record_success(&self) {
        let mut phase = self.phase.lock();
        *phase = match *phase {
            Phase::HalfOpen { successes } if successes + 1 < self.config.success_threshold => {
                Phase::HalfOpen {
                    successes: successes + 1,
                }
            },
            Phase::HalfOpen { .. } => {
                debug!(circuit = %self.name, "Circuit closed");
                Phase::Closed { failures: 0 }
            },
            Phase::Closed { .. } | Phase::Open { .. } => Phase::Closed { failures: 0 },
        };
    }

    fn record_failure(&self) {
        let mut phase = self.phase.lock();
        let open = match *phase {
            Phase::Closed { failures } if failures + 1 < self.config.failure_threshold => {
                *phase = Phase::Closed {
                    failures: failures + 1,
                };
                false
            },
            Phase::Closed { .. } | Phase::HalfOpen { .. } => true,
            Phase::Open { .. } => false,
        };

        if open {
            warn!(
                circuit = %self.name,
                open_secs = self.config.open_secs,
                "Circuit opened after provider failures"
            );
            *phase = Phase::Open {
                since: Instant::now(),
            };
        }
    }
}
