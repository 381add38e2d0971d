//! Controller configuration domain model.

use serde::{Deserialize, Serialize};

use crate::enhance::RetryPolicy;
use crate::error::EnhanceError;

/// Configuration consumed by the enhancement lifecycle controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Quiet period after the last raw change before text counts as settled.
    pub quiet_period_ms: u64,

    /// Minimum trimmed length worth enhancing.
    pub min_text_length: usize,

    /// Relay retry policy.
    pub retry: RetryPolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 700,
            min_text_length: 3,
            retry: RetryPolicy::default(),
        }
    }
}

impl ControllerConfig {
    /// Trim raw surface text into settled text, or report that there is
    /// nothing worth enhancing.
    pub fn settle(&self, raw: &str) -> Result<String, EnhanceError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() < self.min_text_length {
            Err(EnhanceError::InputTooShort)
        } else {
            Ok(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.quiet_period_ms, 700);
        assert_eq!(config.min_text_length, 3);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn settle_trims_and_enforces_the_minimum() {
        let config = ControllerConfig::default();
        assert_eq!(config.settle("  fix my code  ").unwrap(), "fix my code");
        assert_eq!(config.settle("hi"), Err(EnhanceError::InputTooShort));
        assert_eq!(config.settle("   \n  "), Err(EnhanceError::InputTooShort));
        // Exactly at the minimum counts.
        assert_eq!(config.settle("abc").unwrap(), "abc");
    }
}
