//! # Circuit Breaker Module
//!
//! Stops sending requests to the backend after repeated failures so a
//! struggling server is not hammered by retries, and lets a request through
//! again once the reset window has passed.

use log::{info, warn};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::RecoveryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker for backend requests
///
/// # State Machine
///
/// - **Closed**: requests pass through
/// - **Open**: `circuit_breaker_threshold` consecutive failures recorded and
///   the reset window has not elapsed; requests fail fast
/// - **Half-Open**: the reset window elapsed; the next request is let through
///   and its outcome closes or re-opens the circuit
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    reset_after: Duration,
}

impl CircuitBreaker {
    pub fn new(config: &RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            threshold: config.circuit_breaker_threshold.max(1),
            reset_after: Duration::from_secs(config.circuit_breaker_reset_secs),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether requests should currently fail fast
    pub fn is_open(&self) -> bool {
        self.is_open_at(Instant::now())
    }

    fn is_open_at(&self, now: Instant) -> bool {
        let state = self.lock();
        if state.consecutive_failures < self.threshold {
            return false;
        }
        match state.last_failure {
            Some(at) => now.saturating_duration_since(at) < self.reset_after,
            None => false,
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.consecutive_failures += 1;
        state.last_failure = Some(Instant::now());
        if state.consecutive_failures == self.threshold {
            warn!(
                "Backend circuit opened after {} consecutive failures",
                state.consecutive_failures
            );
        }
    }

    pub fn record_success(&self) {
        let mut state = self.lock();
        if state.consecutive_failures >= self.threshold {
            info!("Backend circuit closed");
        }
        *state = BreakerState::default();
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold: u32, reset_secs: u64) -> RecoveryConfig {
        RecoveryConfig {
            circuit_breaker_threshold: threshold,
            circuit_breaker_reset_secs: reset_secs,
            ..RecoveryConfig::default()
        }
    }

    #[test]
    fn test_opens_at_threshold() {
        let breaker = CircuitBreaker::new(&config(2, 60));
        assert!(!breaker.is_open());
        breaker.record_failure();
        assert!(!breaker.is_open());
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[test]
    fn test_success_closes() {
        let breaker = CircuitBreaker::new(&config(1, 60));
        breaker.record_failure();
        assert!(breaker.is_open());
        breaker.record_success();
        assert!(!breaker.is_open());
        assert_eq!(breaker.consecutive_failures(), 0);
    }

    #[test]
    fn test_half_open_after_reset_window() {
        let breaker = CircuitBreaker::new(&config(1, 10));
        breaker.record_failure();
        assert!(breaker.is_open_at(Instant::now()));
        assert!(!breaker.is_open_at(Instant::now() + Duration::from_secs(11)));
    }
}
