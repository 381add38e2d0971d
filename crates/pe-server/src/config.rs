//! Service configuration, sourced from the environment.

use std::env;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

/// Provider-facing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL of the generateContent-style API.
    pub api_base: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
}

/// Full service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Exact embedder origin allowed by CORS; anything goes when unset.
    pub allowed_origin: Option<String>,
    pub max_body_bytes: usize,
    /// `/enhance` requests allowed per IP per minute.
    pub rate_limit_max: u32,
    /// Requests allowed per IP per minute across all endpoints.
    pub global_rate_limit_max: u32,
    pub provider: ProviderConfig,
}

impl ServiceConfig {
    /// Read the configuration from the environment. Fails only when the
    /// provider API key is missing; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let api_key = match env::var("GEMINI_API_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ => bail!("GEMINI_API_KEY environment variable is required"),
        };

        Ok(Self {
            host: env_or("HOST", "127.0.0.1".to_string()),
            port: env_or("PORT", 3000),
            environment: env_or("APP_ENV", "development".to_string()),
            allowed_origin: env::var("ALLOWED_ORIGIN").ok().filter(|v| !v.is_empty()),
            max_body_bytes: env_or("MAX_BODY_BYTES", 5 * 1024),
            rate_limit_max: env_or("RATE_LIMIT_MAX", 10),
            global_rate_limit_max: env_or("GLOBAL_RATE_LIMIT_MAX", 30),
            provider: ProviderConfig {
                api_key,
                model: env_or("MODEL", "gemini-2.0-flash-exp".to_string()),
                api_base: env_or(
                    "GEMINI_API_BASE",
                    "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
                ),
                max_retries: env_or("MAX_RETRIES", 3),
                retry_delay_ms: env_or("RETRY_DELAY_MS", 1000),
                timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            },
        })
    }
}
