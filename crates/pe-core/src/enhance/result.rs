//! Enhancement result value objects.

use serde::{Deserialize, Serialize};

/// Provider token accounting for one enhancement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Immutable outcome of a successful enhancement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementResult {
    /// Exact text the enhancement was produced from.
    pub source_text: String,
    pub enhanced_text: String,
    pub usage: TokenUsage,
    pub latency_ms: u64,
}
