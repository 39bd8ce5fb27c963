//! Process-wide circuit breaker guarding the LLM collaborator.
//!
//! Closed -> Open after `failure_threshold` consecutive failures. Open ->
//! HalfOpen after `reset_timeout`. HalfOpen -> Closed after
//! `success_threshold` consecutive probe successes; any HalfOpen failure
//! sends it straight back to Open.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

use crate::config::CircuitBreakerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
    config: CircuitBreakerConfig,
}

pub struct CircuitBreaker {
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                opened_at: None,
                config,
            }),
        }
    }

    /// Current state, advancing Open -> HalfOpen if the reset timeout has
    /// elapsed.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == CircuitState::Open {
            if let Some(opened_at) = inner.opened_at {
                if opened_at.elapsed() >= Duration::from_secs(inner.config.reset_timeout_secs) {
                    inner.state = CircuitState::HalfOpen;
                    inner.consecutive_successes = 0;
                }
            }
        }
        inner.state
    }

    /// Whether a call should be attempted right now.
    pub fn allow_request(&self) -> bool {
        !matches!(self.state(), CircuitState::Open)
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.consecutive_failures = 0;
        match inner.state {
            CircuitState::HalfOpen => {
                inner.consecutive_successes += 1;
                if inner.consecutive_successes >= inner.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.opened_at = None;
                }
            }
            CircuitState::Closed => {}
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.consecutive_successes = 0;
        match inner.state {
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
            }
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= inner.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn retry_after(&self) -> Duration {
        let inner = self.inner.lock().unwrap();
        match inner.opened_at {
            Some(opened_at) => {
                let full = Duration::from_secs(inner.config.reset_timeout_secs);
                full.saturating_sub(opened_at.elapsed())
            }
            None => Duration::ZERO,
        }
    }
}

static LLM_CIRCUIT: Lazy<CircuitBreaker> = Lazy::new(|| CircuitBreaker::new(CircuitBreakerConfig::default()));

pub fn llm_circuit() -> &'static CircuitBreaker {
    &LLM_CIRCUIT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 3,
            success_threshold: 2,
            reset_timeout_secs: 0,
        })
    }

    #[test]
    fn opens_after_threshold_failures() {
        let cb = breaker();
        for _ in 0..3 {
            cb.record_failure();
        }
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.allow_request());
    }

    #[test]
    fn half_open_failure_reopens() {
        let cb = breaker();
        for _ in 0..3 {
            cb.record_failure();
        }
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn half_open_recovers_after_success_threshold() {
        let cb = breaker();
        for _ in 0..3 {
            cb.record_failure();
        }
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }
}
