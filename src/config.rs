//! Configuration module for the wine recognition service.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// RapidAPI credentials for the upstream recognition provider.
///
/// Loaded once at startup and never mutated. `Debug` is redacted so the
/// values cannot end up in a log line by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamCredentials {
    pub api_key: String,
    pub api_host: String,
}

impl UpstreamCredentials {
    /// Build credentials, returning `None` unless both values are non-empty.
    pub fn new(api_key: impl Into<String>, api_host: impl Into<String>) -> Option<Self> {
        let api_key = api_key.into().trim().to_string();
        let api_host = api_host.into().trim().to_string();
        if api_key.is_empty() || api_host.is_empty() {
            return None;
        }
        Some(Self { api_key, api_host })
    }
}

impl fmt::Debug for UpstreamCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamCredentials")
            .field("api_key", &"<redacted>")
            .field("api_host", &"<redacted>")
            .finish()
    }
}

/// Main service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub credentials: Option<UpstreamCredentials>,
    pub rapidapi_base_url: String,
    pub rapidapi_results_path: String,
    pub rapidapi_version_path: String,
    pub timeout_seconds: f64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub max_file_size_bytes: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub frontend_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
            credentials: None,
            rapidapi_base_url: "https://wine-recognition2.p.rapidapi.com".to_string(),
            rapidapi_results_path: "/v1/results".to_string(),
            rapidapi_version_path: "/v1/version".to_string(),
            timeout_seconds: 10.0,
            max_retries: 1,
            retry_backoff_ms: 200,
            max_file_size_bytes: 10 * 1024 * 1024,
            default_top_k: 5,
            max_top_k: 10,
            frontend_origin: "*".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_top_k = env_or("MAX_TOP_K", defaults.max_top_k).max(1);

        Self {
            port: env_or("PORT", defaults.port),
            host: std::env::var("HOST").unwrap_or(defaults.host),
            credentials: UpstreamCredentials::new(
                std::env::var("RAPIDAPI_KEY").unwrap_or_default(),
                std::env::var("RAPIDAPI_HOST").unwrap_or_default(),
            ),
            rapidapi_base_url: std::env::var("RAPIDAPI_BASE_URL")
                .unwrap_or(defaults.rapidapi_base_url),
            rapidapi_results_path: std::env::var("RAPIDAPI_RESULTS_PATH")
                .unwrap_or(defaults.rapidapi_results_path),
            rapidapi_version_path: std::env::var("RAPIDAPI_VERSION_PATH")
                .unwrap_or(defaults.rapidapi_version_path),
            timeout_seconds: env_or("HTTP_TIMEOUT_SECONDS", defaults.timeout_seconds),
            max_retries: env_or("HTTP_MAX_RETRIES", defaults.max_retries),
            retry_backoff_ms: env_or("HTTP_RETRY_BACKOFF_MS", defaults.retry_backoff_ms),
            max_file_size_bytes: env_or("MAX_FILE_SIZE_BYTES", defaults.max_file_size_bytes),
            default_top_k: env_or("DEFAULT_TOP_K", defaults.default_top_k).clamp(1, max_top_k),
            max_top_k,
            frontend_origin: std::env::var("FRONTEND_ORIGIN").unwrap_or(defaults.frontend_origin),
        }
    }

    /// Check if the upstream credentials are present.
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Per-attempt upstream timeout.
    pub fn timeout(&self) -> Duration {
        match Duration::try_from_secs_f64(self.timeout_seconds) {
            Ok(timeout) if !timeout.is_zero() => timeout,
            _ => Duration::from_secs(10),
        }
    }

    /// CORS origins as a list. A `*` entry means any origin.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.frontend_origin
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
