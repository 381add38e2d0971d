//! Relay-to-service wire contract.
//!
//! JSON bodies exchanged over `POST /enhance` and `GET /health`. Field names
//! follow the wire convention (camelCase), not Rust style.

use serde::{Deserialize, Serialize};

use crate::enhance::TokenUsage;

/// `POST /enhance` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequestBody {
    pub original_prompt: String,
}

/// `POST /enhance` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponseBody {
    pub enhanced_prompt: String,
    pub usage: TokenUsage,
    pub latency_ms: u64,
}

/// Failure body for any non-2xx service answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub timestamp: String,
    /// Seconds since the service started.
    pub uptime: f64,
    pub environment: String,
    pub model: String,
}
