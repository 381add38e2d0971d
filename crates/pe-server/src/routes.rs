//! Router assembly and shared state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::handlers;
use crate::provider::ProviderClient;
use crate::rate_limit::{self, RateLimiter};

const RATE_WINDOW: Duration = Duration::from_secs(60);

pub struct AppState {
    pub config: ServiceConfig,
    pub provider: ProviderClient,
    pub started_at: Instant,
    pub enhance_limiter: RateLimiter,
    pub global_limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> anyhow::Result<Self> {
        let provider = ProviderClient::new(config.provider.clone())?;
        Ok(Self {
            enhance_limiter: RateLimiter::new(RATE_WINDOW, config.rate_limit_max),
            global_limiter: RateLimiter::new(RATE_WINDOW, config.global_rate_limit_max),
            provider,
            started_at: Instant::now(),
            config,
        })
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    info!(
        method = %request.method(),
        path = %request.uri().path(),
        "incoming request"
    );
    next.run(request).await
}

fn cors_layer(config: &ServiceConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86_400));

    match &config.allowed_origin {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
            Err(_) => {
                warn!(origin, "unparsable ALLOWED_ORIGIN, allowing any origin");
                layer.allow_origin(Any)
            }
        },
        None => layer.allow_origin(Any),
    }
}

/// Assemble the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let enhance = post(handlers::enhance_prompt).layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit::enhance_limit,
    ));

    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .route("/enhance", enhance)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::global_limit,
        ))
        .layer(middleware::from_fn(log_request))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors_layer(&state.config))
        .with_state(state)
}
