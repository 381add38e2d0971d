//! HTTP-level tests for the enhancement service.
//!
//! Drive the real router with `tower::ServiceExt::oneshot`; the provider
//! behind it is a mockito server speaking the generateContent shape.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use pe_server::config::{ProviderConfig, ServiceConfig};
use pe_server::routes::{router, AppState};

fn test_config(api_base: &str, rate_limit_max: u32) -> ServiceConfig {
    ServiceConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        allowed_origin: None,
        max_body_bytes: 5 * 1024,
        rate_limit_max,
        global_rate_limit_max: 100,
        provider: ProviderConfig {
            api_key: "test-key".to_string(),
            model: "gemini-test".to_string(),
            api_base: api_base.to_string(),
            max_retries: 2,
            retry_delay_ms: 1,
            timeout_ms: 5_000,
        },
    }
}

fn test_router(api_base: &str, rate_limit_max: u32) -> Router {
    let state = Arc::new(AppState::new(test_config(api_base, rate_limit_max)).unwrap());
    router(state)
}

fn enhance_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/enhance")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn provider_reply(text: &str) -> String {
    json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}],
        "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 32, "totalTokenCount": 42}
    })
    .to_string()
}

#[tokio::test]
async fn enhance_round_trip_returns_usage_and_latency() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/gemini-test:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(provider_reply("Fix the **bug** in..."))
        .create_async()
        .await;

    let app = test_router(&server.url(), 10);
    let response = app
        .oneshot(enhance_request(r#"{"originalPrompt":"fix my code"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["enhancedPrompt"], "Fix the bug in...");
    assert_eq!(body["usage"]["totalTokens"], 42);
    assert!(body["latencyMs"].is_u64());
}

#[tokio::test]
async fn wrong_content_type_is_415_with_error_shape() {
    let app = test_router("http://unused.invalid", 10);
    let request = Request::builder()
        .method("POST")
        .uri("/enhance")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"originalPrompt":"fix my code"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = body_json(response).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "Content-Type must be application/json");
}

#[tokio::test]
async fn missing_prompt_field_is_400() {
    let app = test_router("http://unused.invalid", 10);
    let response = app
        .oneshot(enhance_request(r#"{"somethingElse":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "originalPrompt is required");
}

#[tokio::test]
async fn empty_prompt_is_400() {
    let app = test_router("http://unused.invalid", 10);
    let response = app
        .oneshot(enhance_request(r#"{"originalPrompt":"   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn symbol_only_prompt_is_400() {
    let app = test_router("http://unused.invalid", 10);
    let response = app
        .oneshot(enhance_request(r#"{"originalPrompt":"!!! ??? ..."}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "originalPrompt must be a non-empty string with valid content"
    );
}

#[tokio::test]
async fn provider_outage_maps_to_503_after_retries() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/gemini-test:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let app = test_router(&server.url(), 10);
    let response = app
        .oneshot(enhance_request(r#"{"originalPrompt":"fix my code"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"], true);
    mock.assert_async().await;
}

#[tokio::test]
async fn enhance_rate_limit_answers_429_when_exhausted() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/gemini-test:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(provider_reply("Enhanced"))
        .expect(2)
        .create_async()
        .await;

    let app = test_router(&server.url(), 2);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(enhance_request(r#"{"originalPrompt":"fix my code"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(enhance_request(r#"{"originalPrompt":"fix my code"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Too many requests. Please try again later.");
}

#[tokio::test]
async fn health_reports_status_environment_and_model() {
    let app = test_router("http://unused.invalid", 10);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["model"], "gemini-test");
    assert!(body["timestamp"].is_string());
    assert!(body["uptime"].is_number());
}

#[tokio::test]
async fn root_lists_the_endpoints() {
    let app = test_router("http://unused.invalid", 10);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "PromptEnhance Backend");
    assert_eq!(body["endpoints"]["enhance"], "POST /enhance");
    assert_eq!(body["endpoints"]["health"], "GET /health");
}
