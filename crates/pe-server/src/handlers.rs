//! Endpoint handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use pe_core::protocol::{EnhanceRequestBody, EnhanceResponseBody, HealthBody};

use crate::error::ServiceError;
use crate::routes::AppState;
use crate::sanitize::is_valid_prompt;

fn map_json_rejection(rejection: JsonRejection) -> ServiceError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => ServiceError::new(
            axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Content-Type must be application/json",
        ),
        JsonRejection::JsonDataError(_) => ServiceError::bad_request("originalPrompt is required"),
        _ => ServiceError::bad_request("Request body is required"),
    }
}

/// `POST /enhance` - validate, sanitize, enhance, measure.
pub async fn enhance_prompt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EnhanceRequestBody>, JsonRejection>,
) -> Result<Json<EnhanceResponseBody>, ServiceError> {
    let started = Instant::now();
    let Json(body) = payload.map_err(map_json_rejection)?;

    if body.original_prompt.trim().is_empty() {
        return Err(ServiceError::bad_request("originalPrompt is required"));
    }
    if !is_valid_prompt(&body.original_prompt) {
        return Err(ServiceError::bad_request(
            "originalPrompt must be a non-empty string with valid content",
        ));
    }

    info!(
        prompt_length = body.original_prompt.len(),
        "received enhance request"
    );

    let (enhanced_prompt, usage) = state
        .provider
        .enhance_prompt(&body.original_prompt)
        .await
        .map_err(|err| {
            error!(error = %err, latency_ms = started.elapsed().as_millis() as u64, "failed to enhance prompt");
            err
        })?;

    let latency_ms = started.elapsed().as_millis() as u64;
    info!(
        original_length = body.original_prompt.len(),
        enhanced_length = enhanced_prompt.len(),
        tokens_used = usage.total_tokens,
        latency_ms,
        "prompt enhanced successfully"
    );

    Ok(Json(EnhanceResponseBody {
        enhanced_prompt,
        usage,
        latency_ms,
    }))
}

/// `GET /health` - service status and configuration info.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthBody> {
    debug!("health check requested");
    Json(HealthBody {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.config.environment.clone(),
        model: state.provider.model().to_string(),
    })
}

/// `GET /` - service descriptor.
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "name": "PromptEnhance Backend",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "enhance": "POST /enhance",
            "health": "GET /health",
        },
    }))
}
