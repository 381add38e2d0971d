//! Provider client.
//!
//! Talks to a generateContent-style text API with a bounded timeout and its
//! own retry/backoff for transient provider failures. Client errors (4xx)
//! are the caller's problem and abort immediately.

use std::time::Duration;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use pe_core::enhance::TokenUsage;

use crate::config::ProviderConfig;
use crate::error::ServiceError;
use crate::sanitize::{markdown_to_plain_text, sanitize_input};

/// Instruction wrapped around every user prompt.
const ENHANCEMENT_SYSTEM_PROMPT: &str = "You are a world-class prompt engineer. Take the user's raw prompt and produce a single, final enhanced prompt that is clearer, more structured, and maximally effective for a language model to execute - nothing else.

Rules:
1. Return ONLY the enhanced prompt as plain text. No explanation, metadata, commentary, JSON wrappers, headings, code fences, or lists outside the enhanced prompt itself.
2. Preserve the user's original intent exactly. Do not change the goal or introduce unrelated tasks.
3. Improve clarity, specificity, structure, and constraints. Add a role, explicit output format, length, and style instructions where they strengthen the prompt.
4. Do not invent new goals, add filler, or include citations or links.
5. If essential information is missing, make the least intrusive explicit assumption and note it in a single short parenthetical.
6. Keep the enhanced prompt in the same language as the user's input, in plain text with newlines for structure - no markdown syntax.
7. Make it as short as possible while complete.

Produce the enhanced prompt for the user prompt below, outputting strictly that text only.";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
    total_token_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    usage_metadata: Option<UsageMetadata>,
}

pub struct ProviderClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sanitize, wrap and enhance one prompt.
    pub async fn enhance_prompt(
        &self,
        original_prompt: &str,
    ) -> Result<(String, TokenUsage), ServiceError> {
        let sanitized = sanitize_input(original_prompt);
        if sanitized.is_empty() {
            return Err(ServiceError::bad_request(
                "Invalid or empty prompt after sanitization",
            ));
        }

        info!(
            original_length = original_prompt.len(),
            sanitized_length = sanitized.len(),
            "enhancing prompt"
        );

        let full_prompt =
            format!("{ENHANCEMENT_SYSTEM_PROMPT}\n\nUser Prompt to Enhance:\n{sanitized}");
        self.call_with_retry(&full_prompt).await
    }

    async fn call_with_retry(&self, prompt: &str) -> Result<(String, TokenUsage), ServiceError> {
        let max_retries = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=max_retries {
            debug!(attempt, max_retries, "provider call attempt");

            match self.call_once(prompt).await {
                Ok((enhanced, usage)) => {
                    info!(attempt, tokens_used = usage.total_tokens, "provider call successful");
                    return Ok((enhanced, usage));
                }
                Err(err) => {
                    warn!(
                        attempt,
                        error = %err,
                        will_retry = attempt < max_retries && !err.is_client_error(),
                        "provider call failed"
                    );

                    if err.is_client_error() {
                        return Err(err);
                    }

                    last_error = Some(err);
                    if attempt < max_retries {
                        let delay = self.config.retry_delay_ms * 2u64.pow(attempt - 1);
                        sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }

        error!(
            attempts = max_retries,
            last_error = %last_error.map(|e| e.to_string()).unwrap_or_default(),
            "all provider retry attempts failed"
        );
        Err(ServiceError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Failed to enhance prompt after multiple attempts. Please try again later.",
        ))
    }

    async fn call_once(&self, prompt: &str) -> Result<(String, TokenUsage), ServiceError> {
        let url = format!(
            "{}/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_provider_status(status));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|_| invalid_structure())?;

        let text = body
            .candidates
            .and_then(|mut candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    candidates.remove(0).content
                }
            })
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(invalid_structure)?;

        let metadata = body.usage_metadata.unwrap_or_default();
        let usage = TokenUsage {
            input_tokens: metadata.prompt_token_count.unwrap_or(0),
            output_tokens: metadata.candidates_token_count.unwrap_or(0),
            total_tokens: metadata.total_token_count.unwrap_or(0),
        };

        Ok((markdown_to_plain_text(&text), usage))
    }
}

fn invalid_structure() -> ServiceError {
    ServiceError::new(
        StatusCode::BAD_GATEWAY,
        "Invalid response structure from provider",
    )
}

fn map_transport_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::new(StatusCode::GATEWAY_TIMEOUT, "Request to provider timed out")
    } else if err.is_connect() {
        ServiceError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "No response from provider. Please check your connection.",
        )
    } else {
        ServiceError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to communicate with provider",
        )
    }
}

fn map_provider_status(status: StatusCode) -> ServiceError {
    match status.as_u16() {
        400 => ServiceError::bad_request("Invalid request to provider"),
        401 | 403 => ServiceError::new(
            StatusCode::UNAUTHORIZED,
            "Invalid or missing provider API key",
        ),
        429 => ServiceError::rate_limited("Provider rate limit exceeded. Please try again later."),
        s if s >= 500 => ServiceError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Provider is temporarily unavailable",
        ),
        _ => ServiceError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Provider error: {status}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(api_base: &str, max_retries: u32) -> ProviderConfig {
        ProviderConfig {
            api_key: "test-key".to_string(),
            model: "gemini-test".to_string(),
            api_base: api_base.to_string(),
            max_retries,
            retry_delay_ms: 1,
            timeout_ms: 5_000,
        }
    }

    fn provider_reply(text: &str) -> String {
        json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 30, "totalTokenCount": 42}
        })
        .to_string()
    }

    #[tokio::test]
    async fn successful_call_returns_plain_text_and_usage() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gemini-test:generateContent")
            .match_query(mockito::Matcher::UrlEncoded("key".into(), "test-key".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(provider_reply("**Fix** the `bug` in..."))
            .create_async()
            .await;

        let client = ProviderClient::new(test_config(&server.url(), 3)).unwrap();
        let (enhanced, usage) = client.enhance_prompt("fix my code").await.unwrap();

        assert_eq!(enhanced, "Fix the bug in...");
        assert_eq!(usage.total_tokens, 42);
        assert_eq!(usage.input_tokens, 12);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn transient_provider_failures_consume_every_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gemini-test:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let client = ProviderClient::new(test_config(&server.url(), 3)).unwrap();
        let err = client.enhance_prompt("fix my code").await.unwrap_err();

        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_errors_abort_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gemini-test:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .expect(1)
            .create_async()
            .await;

        let client = ProviderClient::new(test_config(&server.url(), 3)).unwrap();
        let err = client.enhance_prompt("fix my code").await.unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn provider_rate_limit_maps_to_429_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gemini-test:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .expect(1)
            .create_async()
            .await;

        let client = ProviderClient::new(test_config(&server.url(), 3)).unwrap();
        let err = client.enhance_prompt("fix my code").await.unwrap_err();

        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exhausted_retries_map_to_503() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gemini-test:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(502)
            .expect(2)
            .create_async()
            .await;

        let client = ProviderClient::new(test_config(&server.url(), 2)).unwrap();
        let err = client.enhance_prompt("fix my code").await.unwrap_err();

        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.message.contains("multiple attempts"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_candidates_is_a_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/gemini-test:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"candidates": []}).to_string())
            .create_async()
            .await;

        let client = ProviderClient::new(test_config(&server.url(), 1)).unwrap();
        let err = client.enhance_prompt("fix my code").await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn empty_prompt_after_sanitization_is_rejected() {
        let client = ProviderClient::new(test_config("http://unused.invalid", 1)).unwrap();
        let err = client.enhance_prompt("<b></b>").await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
