//! Process-wide client configuration.
//!
//! Built once at startup and passed by reference into `PollApi::from_config`.
//! The base URL is read from `POLLAB_API_BASE_URL` at runtime, falling back
//! to the value of the same variable at build time.

use std::time::Duration;

use thiserror::Error;

use crate::transport::{RetryPolicy, DEFAULT_TIMEOUT};

pub const BASE_URL_VAR: &str = "POLLAB_API_BASE_URL";
pub const MAX_ATTEMPTS_VAR: &str = "POLLAB_MAX_ATTEMPTS";
pub const RETRY_DELAY_VAR: &str = "POLLAB_RETRY_DELAY_MS";
pub const TIMEOUT_VAR: &str = "POLLAB_TIMEOUT_MS";

const BUILD_BASE_URL: Option<&str> = option_env!("POLLAB_API_BASE_URL");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no API base URL configured (set POLLAB_API_BASE_URL)")]
    MissingBaseUrl,

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub retry: RetryPolicy,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration with default retry and timeout settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = resolve_base_url(lookup(BASE_URL_VAR), BUILD_BASE_URL)?;

        let mut config = Self::new(base_url);
        if let Some(attempts) = parse_var(&lookup, MAX_ATTEMPTS_VAR)? {
            config.retry.max_attempts = u32::try_from(attempts)
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    var: MAX_ATTEMPTS_VAR,
                    value: attempts.to_string(),
                })?;
        }
        if let Some(ms) = parse_var(&lookup, RETRY_DELAY_VAR)? {
            config.retry.delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, TIMEOUT_VAR)? {
            config.timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

/// Prefer a non-blank runtime value, then a non-blank build-time value.
fn resolve_base_url(runtime: Option<String>, build_time: Option<&str>) -> Result<String, ConfigError> {
    runtime
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .or_else(|| build_time.map(str::trim).filter(|url| !url.is_empty()))
        .map(str::to_string)
        .ok_or(ConfigError::MissingBaseUrl)
}

fn parse_var<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
