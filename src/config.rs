use crate::tags::CacheLimits;
use std::{env, time::Duration};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid port number, got '{0}'")]
    InvalidPort(String),

    #[error("GITHAPPY_API_URL must be an http(s) URL, got '{0}'")]
    InvalidApiUrl(String),

    #[error("{key} must be a positive whole number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}

/// Settings read from the environment at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL of the changelog backend, without a trailing slash.
    pub api_url: String,
    pub rust_log: String,
    pub tag_caches: CacheLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let api_url = match lookup("GITHAPPY_API_URL") {
            Some(value) => normalize_api_url(&value)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let defaults = CacheLimits::default();
        let tag_caches = CacheLimits {
            capacity: match lookup("TAG_CACHE_CAPACITY") {
                Some(value) => positive("TAG_CACHE_CAPACITY", value)? as usize,
                None => defaults.capacity,
            },
            idle: match lookup("TAG_CACHE_IDLE_SECS") {
                Some(value) => Duration::from_secs(positive("TAG_CACHE_IDLE_SECS", value)?),
                None => defaults.idle,
            },
        };

        Ok(Self {
            port,
            api_url,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            tag_caches,
        })
    }
}

fn positive(key: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(number) if number > 0 => Ok(number),
        _ => Err(ConfigError::InvalidNumber { key, value }),
    }
}

fn normalize_api_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiUrl(value.to_string()));
    }
    Ok(trimmed.to_string())
}
