//! HTTP relay to the enhancement service.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use pe_core::ports::{EnhanceRelayPort, RelayError, RelayReply};
use pe_core::protocol::{EnhanceRequestBody, EnhanceResponseBody, ErrorBody};

/// Ceiling on one relay round trip; the service applies its own, tighter
/// provider timeout underneath this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(35);

/// Relay that POSTs the original prompt to the service's `/enhance`
/// endpoint. Sends exactly one request per call; retrying belongs to the
/// client wrapping this.
pub struct HttpEnhanceRelay {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpEnhanceRelay {
    /// `endpoint` is the full enhance URL, e.g. `http://localhost:3000/enhance`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EnhanceRelayPort for HttpEnhanceRelay {
    async fn request_enhancement(&self, original_prompt: &str) -> Result<RelayReply, RelayError> {
        let body = EnhanceRequestBody {
            original_prompt: original_prompt.to_string(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "relay request failed to reach the service");
                if err.is_timeout() {
                    RelayError::Timeout
                } else if err.is_connect() {
                    RelayError::Connection(err.to_string())
                } else {
                    RelayError::Unavailable
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|failure| failure.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unclassified failure")
                        .to_string()
                });
            warn!(status = status.as_u16(), %message, "service rejected enhancement");
            return Err(RelayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let reply: EnhanceResponseBody = response.json().await.map_err(|err| {
            warn!(error = %err, "service replied with an unreadable body");
            RelayError::MalformedReply
        })?;
        if reply.enhanced_prompt.trim().is_empty() {
            return Err(RelayError::MalformedReply);
        }

        debug!(
            latency_ms = reply.latency_ms,
            tokens = reply.usage.total_tokens,
            "relay received enhanced prompt"
        );
        Ok(RelayReply {
            enhanced_prompt: reply.enhanced_prompt,
            usage: Some(reply.usage),
            latency_ms: Some(reply.latency_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn success_reply_carries_usage_and_latency() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/enhance")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "enhancedPrompt": "Fix the bug in...",
                    "usage": {"inputTokens": 10, "outputTokens": 20, "totalTokens": 30},
                    "latencyMs": 450
                })
                .to_string(),
            )
            .create_async()
            .await;

        let relay = HttpEnhanceRelay::new(format!("{}/enhance", server.url()));
        let reply = relay.request_enhancement("fix my code").await.unwrap();

        assert_eq!(reply.enhanced_prompt, "Fix the bug in...");
        assert_eq!(reply.usage.unwrap().total_tokens, 30);
        assert_eq!(reply.latency_ms, Some(450));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn failure_status_surfaces_the_service_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/enhance")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(json!({"error": true, "message": "provider unavailable"}).to_string())
            .create_async()
            .await;

        let relay = HttpEnhanceRelay::new(format!("{}/enhance", server.url()));
        let err = relay.request_enhancement("fix my code").await.unwrap_err();
        assert_eq!(
            err,
            RelayError::Status {
                status: 503,
                message: "provider unavailable".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unreadable_success_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/enhance")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let relay = HttpEnhanceRelay::new(format!("{}/enhance", server.url()));
        let err = relay.request_enhancement("fix my code").await.unwrap_err();
        assert_eq!(err, RelayError::MalformedReply);
    }

    #[tokio::test]
    async fn unreachable_service_is_a_connection_failure() {
        // Nothing listens on this port.
        let relay = HttpEnhanceRelay::new("http://127.0.0.1:9/enhance");
        let err = relay.request_enhancement("fix my code").await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Connection(_) | RelayError::Unavailable
        ));
    }
}
