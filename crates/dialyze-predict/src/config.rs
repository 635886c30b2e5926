//! Inference endpoint configuration.
//!
//! Resolved once at startup and handed to [`HttpPredictor`](crate::HttpPredictor);
//! nothing reads the environment while a prediction is running.

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the endpoint URL.
pub const ENDPOINT_URL_VAR: &str = "DIALYZE_PREDICT_URL";
/// Environment variable holding an optional request timeout in seconds.
pub const TIMEOUT_SECS_VAR: &str = "DIALYZE_PREDICT_TIMEOUT_SECS";

/// Configuration errors.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Where and how to reach the inference endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    endpoint_url: String,
    timeout: Option<Duration>,
}

impl PredictorConfig {
    /// Create a config. The URL must parse, use http or https, and name a host.
    pub fn new(endpoint_url: impl Into<String>) -> Result<Self, ConfigError> {
        let endpoint_url = endpoint_url.into().trim().to_string();
        let parsed = reqwest::Url::parse(&endpoint_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{endpoint_url} ({e})")))?;
        let has_host = parsed.host_str().is_some_and(|h| !h.is_empty());
        if !matches!(parsed.scheme(), "http" | "https") || !has_host {
            return Err(ConfigError::InvalidUrl(endpoint_url));
        }
        Ok(Self {
            endpoint_url,
            timeout: None,
        })
    }

    /// Set a client-side request timeout. Without one, transport defaults apply.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve from the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let url = std::env::var(ENDPOINT_URL_VAR)
            .map_err(|_| ConfigError::MissingVar(ENDPOINT_URL_VAR))?;
        let timeout = std::env::var(TIMEOUT_SECS_VAR).ok();
        Self::from_parts(&url, timeout.as_deref())
    }

    fn from_parts(url: &str, timeout_secs: Option<&str>) -> Result<Self, ConfigError> {
        let config = Self::new(url)?;
        match timeout_secs.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(config),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(config.with_timeout(Duration::from_secs(secs))),
                _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
            },
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
