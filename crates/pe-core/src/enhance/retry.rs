//! Retry policy for the relay-facing client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Whether a failure is worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Network/timeout/upstream-5xx/rate-limit/malformed-reply; retried
    /// while attempts remain.
    Transient,
    /// Validation or authentication rejection; aborts the attempt loop.
    Terminal,
}

impl FailureClass {
    /// Classify an HTTP-style status from the relay-to-service contract.
    /// 429 backs off like a network fault; every other 4xx is a hard no.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::Transient,
            s if s >= 500 => Self::Transient,
            _ => Self::Terminal,
        }
    }
}

/// Immutable retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after a failed attempt, 1-based:
    /// `base_delay * multiplier^(attempt - 1)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1) as i32;
        let delay = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exp);
        Duration::from_millis(delay as u64)
    }
}
