//! Circuit breaker state machine
//!
//! ```text
//!            failures >= failure_threshold
//!   CLOSED ─────────────────────────────────▶ OPEN
//!     ▲                                        │
//!     │ successes >= success_threshold         │ recovery_timeout elapsed
//!     │                                        ▼
//!     └──────────────────────────────────── HALF_OPEN
//!                     any failure: back to OPEN
//! ```
//!
//! Transitions are pure: every function takes the current [`Circuit`] and a
//! timestamp and returns the next one, so tests drive time explicitly.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Observable state of a circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Calls flow normally
    Closed,
    /// Calls are rejected without reaching the backend
    Open,
    /// Probing whether the backend recovered
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Circuit breaker thresholds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip a closed circuit
    pub failure_threshold: u32,
    /// Time an open circuit waits before admitting a trial call
    pub recovery_timeout: Duration,
    /// Successes in half-open needed to close again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 3,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn new(failure_threshold: u32, recovery_timeout: Duration, success_threshold: u32) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            success_threshold,
        }
    }
}

/// Outcome of one admitted call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    Failure,
}

/// Decision taken before a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Circuit is closed or already half-open
    Allowed,
    /// The call moved an open circuit to half-open and acts as a trial call
    Trial,
    /// Circuit is open and the recovery timeout has not elapsed
    Rejected,
}

impl Admission {
    pub fn is_allowed(self) -> bool {
        !matches!(self, Admission::Rejected)
    }
}

/// Breaker state plus counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circuit {
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub last_failure_at: Option<Instant>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::closed()
    }
}

impl Circuit {
    /// A fresh circuit with zeroed counters
    pub fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            last_failure_at: None,
        }
    }

    /// Decide whether a call may proceed at `now`.
    pub fn admit(self, now: Instant, config: &CircuitBreakerConfig) -> (Self, Admission) {
        match self.state {
            CircuitState::Closed | CircuitState::HalfOpen => (self, Admission::Allowed),
            CircuitState::Open => {
                let elapsed = self
                    .last_failure_at
                    .map(|at| now.saturating_duration_since(at))
                    .unwrap_or(Duration::MAX);

                if elapsed > config.recovery_timeout {
                    let next = Self {
                        state: CircuitState::HalfOpen,
                        success_count: 0,
                        ..self
                    };
                    (next, Admission::Trial)
                } else {
                    (self, Admission::Rejected)
                }
            }
        }
    }

    /// Fold the outcome of an admitted call into the circuit.
    pub fn record(self, outcome: CallOutcome, now: Instant, config: &CircuitBreakerConfig) -> Self {
        match (self.state, outcome) {
            (CircuitState::Closed, CallOutcome::Success) => Self {
                failure_count: 0,
                ..self
            },
            (CircuitState::Closed, CallOutcome::Failure) => {
                let failure_count = self.failure_count.saturating_add(1);
                let state = if failure_count >= config.failure_threshold {
                    CircuitState::Open
                } else {
                    CircuitState::Closed
                };
                Self {
                    state,
                    failure_count,
                    last_failure_at: Some(now),
                    ..self
                }
            }
            (CircuitState::HalfOpen, CallOutcome::Success) => {
                let success_count = self.success_count.saturating_add(1);
                if success_count >= config.success_threshold {
                    Self::closed()
                } else {
                    Self {
                        success_count,
                        ..self
                    }
                }
            }
            (CircuitState::HalfOpen, CallOutcome::Failure) => Self {
                state: CircuitState::Open,
                success_count: 0,
                failure_count: self.failure_count.saturating_add(1),
                last_failure_at: Some(now),
            },
            // A call admitted before another task tripped the circuit
            (CircuitState::Open, CallOutcome::Success) => self,
            (CircuitState::Open, CallOutcome::Failure) => Self {
                failure_count: self.failure_count.saturating_add(1),
                last_failure_at: Some(now),
                ..self
            },
        }
    }
}
