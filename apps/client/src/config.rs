use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Client configuration loaded from environment variables.
/// Only the backend base URL is required; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin, e.g. `https://api.portman.app`. No trailing slash needed.
    pub base_url: String,
    /// API version segment composed into every URL: `{base_url}/api/{version}/...`.
    pub api_version: String,
    /// Per-attempt timeout for functional requests.
    pub request_timeout: Duration,
    /// Attempt budget per logical request. Always at least 1.
    pub max_retries: u32,
    /// Base delay between attempts; attempt N waits `retry_delay * N`.
    pub retry_delay: Duration,
    /// Per-probe timeout for health checks (shorter than request_timeout).
    pub probe_timeout: Duration,
    /// Recurring health poll interval. This is a low-frequency signal,
    /// minutes not seconds.
    pub poll_interval: Duration,
    /// Optional path for persisted client state. None disables persistence.
    pub state_file: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            base_url: require_env("PORTMAN_API_BASE_URL")?,
            api_version: env_or("PORTMAN_API_VERSION", "v1"),
            request_timeout: Duration::from_secs(parse_env("PORTMAN_REQUEST_TIMEOUT_SECS", 30)?),
            max_retries: parse_env::<u32>("PORTMAN_MAX_RETRIES", 3)?.max(1),
            retry_delay: Duration::from_millis(parse_env("PORTMAN_RETRY_DELAY_MS", 1000)?),
            probe_timeout: Duration::from_secs(parse_env("PORTMAN_PROBE_TIMEOUT_SECS", 5)?),
            poll_interval: Duration::from_secs(parse_env("PORTMAN_POLL_INTERVAL_SECS", 120)?),
            state_file: std::env::var("PORTMAN_STATE_FILE").ok().map(PathBuf::from),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(default),
    }
}
