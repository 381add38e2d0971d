//! Relay channel port - the asynchronous request/response bridge to a
//! network-capable context.

use async_trait::async_trait;
use thiserror::Error;

use crate::enhance::TokenUsage;

/// Successful relay reply. `usage` and `latency_ms` ride along when the
/// channel can see them; a minimal channel that only ferries the enhanced
/// text leaves them `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    pub enhanced_prompt: String,
    pub usage: Option<TokenUsage>,
    pub latency_ms: Option<u64>,
}

/// Why a relay request produced no enhanced text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("relay request timed out")]
    Timeout,

    #[error("relay connection failed: {0}")]
    Connection(String),

    /// The service answered with a failure status.
    #[error("service answered {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx reply whose body did not carry a usable enhanced prompt.
    #[error("malformed relay reply")]
    MalformedReply,

    /// The channel could not classify the failure; equivalent to the null
    /// reply of a minimal relay.
    #[error("relay unavailable")]
    Unavailable,
}

/// One-operation relay contract: ship the original prompt out, get the
/// enhanced prompt (or a classified failure) back. Implementations send
/// exactly one request per call; retrying is the caller's policy.
#[async_trait]
pub trait EnhanceRelayPort: Send + Sync {
    async fn request_enhancement(&self, original_prompt: &str) -> Result<RelayReply, RelayError>;
}
