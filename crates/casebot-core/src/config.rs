//! Environment-backed configuration helpers shared by the per-crate configs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// Timeout applied to every outbound HTTP call, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Parse an optional raw setting, falling back to `default` when absent or blank
pub fn parse_setting<T: FromStr>(key: &str, raw: Option<&str>, default: T) -> Result<T> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            Error::Configuration(format!("{} has an invalid value: {:?}", key, value))
        }),
    }
}

/// Read and parse an environment variable with a default
pub fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    let raw = env::var(key).ok();
    parse_setting(key, raw.as_deref(), default)
}

/// Read an optional, non-blank environment variable
pub fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Validate that a setting holds an absolute http(s) URL
pub fn validate_url(key: &str, value: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(value)
        .map_err(|e| Error::Configuration(format!("{} is not a valid URL ({}): {}", key, e, value)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Error::Configuration(format!(
            "{} must use http or https, got {}",
            key, other
        ))),
    }
}

/// The single request timeout shared by the LLM, embedding and email clients
pub fn request_timeout_from_env() -> Result<Duration> {
    env_or("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS).map(Duration::from_secs)
}
