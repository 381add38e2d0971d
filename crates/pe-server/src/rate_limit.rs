//! Per-IP fixed-window rate limiting.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::ServiceError;
use crate::routes::AppState;

/// Fixed 60-second window counter keyed by caller IP.
pub struct RateLimiter {
    window: Duration,
    max: u32,
    hits: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max: u32) -> Self {
        Self {
            window,
            max,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request against `key`; `false` once the window is exhausted.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut hits = self
            .hits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = hits.entry(key.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }
        if entry.1 >= self.max {
            false
        } else {
            entry.1 += 1;
            true
        }
    }
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Lenient limiter over every endpoint.
pub async fn global_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    if !state.global_limiter.allow(&key) {
        warn!(ip = %key, "global rate limit exceeded");
        return ServiceError::rate_limited("Too many requests from this IP. Please try again later.")
            .into_response();
    }
    next.run(request).await
}

/// Tighter limiter for `/enhance`, matched to the provider's request budget.
pub async fn enhance_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    if !state.enhance_limiter.allow(&key) {
        warn!(ip = %key, "enhance rate limit exceeded");
        return ServiceError::rate_limited("Too many requests. Please try again later.")
            .into_response();
    }
    next.run(request).await
}
