//! Retrying relay client.
//!
//! Wraps the relay port with the bounded-retry policy: one logical request
//! per attempt, exponential backoff between transient failures, immediate
//! abort on terminal ones.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, warn};

use pe_core::enhance::{EnhancementRequest, FailureClass, RetryPolicy};
use pe_core::ports::{ClockPort, EnhanceRelayPort, RelayError};
use pe_core::{EnhanceError, EnhancementResult};

fn classify(error: &RelayError) -> FailureClass {
    match error {
        RelayError::Status { status, .. } => FailureClass::from_status(*status),
        // Timeouts, connection faults, malformed replies and unclassified
        // relay failures all back off and try again.
        _ => FailureClass::Transient,
    }
}

pub struct RetryingClient {
    relay: Arc<dyn EnhanceRelayPort>,
    policy: RetryPolicy,
    clock: Arc<dyn ClockPort>,
}

impl RetryingClient {
    pub fn new(relay: Arc<dyn EnhanceRelayPort>, policy: RetryPolicy, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            relay,
            policy,
            clock,
        }
    }

    /// Run one request through the retry policy.
    pub async fn enhance(&self, source_text: &str) -> Result<EnhancementResult, EnhanceError> {
        let request = EnhancementRequest::new(source_text, self.clock.now_ms());
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            debug!(request_id = %request.id, attempt, max_attempts, "enhancement attempt");

            match self.relay.request_enhancement(source_text).await {
                Ok(reply) => {
                    let latency_ms = reply.latency_ms.unwrap_or_else(|| {
                        (self.clock.now_ms() - request.requested_at_ms).max(0) as u64
                    });
                    debug!(request_id = %request.id, attempt, latency_ms, "enhancement succeeded");
                    return Ok(EnhancementResult {
                        source_text: request.source_text,
                        enhanced_text: reply.enhanced_prompt,
                        usage: reply.usage.unwrap_or_default(),
                        latency_ms,
                    });
                }
                Err(error) => {
                    if classify(&error) == FailureClass::Terminal {
                        warn!(request_id = %request.id, attempt, %error, "terminal failure, not retrying");
                        return Err(EnhanceError::Terminal(error.to_string()));
                    }

                    warn!(
                        request_id = %request.id,
                        attempt,
                        max_attempts,
                        %error,
                        will_retry = attempt < max_attempts,
                        "transient enhancement failure"
                    );
                    last_error = Some(error);

                    if attempt < max_attempts {
                        sleep(self.policy.delay_for_attempt(attempt)).await;
                    }
                }
            }
        }

        warn!(
            request_id = %request.id,
            attempts = max_attempts,
            last_error = %last_error.map(|e| e.to_string()).unwrap_or_default(),
            "enhancement attempts exhausted"
        );
        Err(EnhanceError::ExhaustedRetries {
            attempts: max_attempts,
        })
    }
}
