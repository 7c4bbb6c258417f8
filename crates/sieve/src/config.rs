use std::time::Duration;

use anyhow::{Context, Result};

use crate::limiter::RateLimiterConfig;
use crate::retry::DEFAULT_MAX_ATTEMPTS;

/// Engine configuration, loaded from environment variables.
///
/// Only the provider endpoint and API key are required; every tuning knob
/// falls back to the defaults the original deployment ran with.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Full chat-completions URL of the provider deployment.
    pub api_endpoint: String,
    pub api_key: String,
    /// Per-attempt HTTP timeout. Bounds how long the worker can hang on one
    /// stalled request.
    pub request_timeout: Duration,
    /// Token budget for each extraction response.
    pub max_tokens: u32,
    /// Retry budget per logical call.
    pub max_attempts: u32,
    /// Documents longer than this are truncated before prompting.
    pub max_document_chars: usize,
    pub rate_limiter: RateLimiterConfig,
}

impl EngineConfig {
    /// Reads `SIEVE_*` variables, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(EngineConfig {
            api_endpoint: require_env("SIEVE_API_ENDPOINT")?,
            api_key: require_env("SIEVE_API_KEY")?,
            request_timeout: Duration::from_secs(env_or("SIEVE_REQUEST_TIMEOUT_SECS", 60)?),
            max_tokens: env_or("SIEVE_MAX_TOKENS", 4000)?,
            max_attempts: env_or("SIEVE_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            max_document_chars: env_or("SIEVE_MAX_DOCUMENT_CHARS", 15_000)?,
            rate_limiter: RateLimiterConfig {
                initial_delay: Duration::from_secs_f64(env_or("SIEVE_RATE_INITIAL_DELAY", 1.0)?),
                max_delay: Duration::from_secs_f64(env_or("SIEVE_RATE_MAX_DELAY", 60.0)?),
                growth_factor: env_or("SIEVE_RATE_GROWTH_FACTOR", 1.5)?,
                shrink_factor: env_or("SIEVE_RATE_SHRINK_FACTOR", 1.2)?,
            },
        })
    }

    /// Configuration for direct construction in embedding code and tests.
    pub fn new(api_endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        EngineConfig {
            api_endpoint: api_endpoint.into(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(60),
            max_tokens: 4000,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_document_chars: 15_000,
            rate_limiter: RateLimiterConfig::default(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid value")),
        Err(_) => Ok(default),
    }
}
