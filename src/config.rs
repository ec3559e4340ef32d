//! Runtime configuration read from the environment.

use std::{env, fmt::Display, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_POLL_SECS: u64 = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontConfig {
    /// Base URL of the backend, without a trailing slash.
    pub api_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl StorefrontConfig {
    /// Reads `STOREFRONT_API_URL`, `STOREFRONT_POLL_SECS` and `STOREFRONT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url: String = try_load(&lookup, "STOREFRONT_API_URL", DEFAULT_API_URL)?;
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "STOREFRONT_API_URL",
                value: api_url,
                reason: "expected an http(s) URL".into(),
            });
        }

        let poll_secs = positive(
            "STOREFRONT_POLL_SECS",
            try_load(&lookup, "STOREFRONT_POLL_SECS", &DEFAULT_POLL_SECS.to_string())?,
        )?;
        let timeout_secs = positive(
            "STOREFRONT_TIMEOUT_SECS",
            try_load(&lookup, "STOREFRONT_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())?,
        )?;

        Ok(Self {
            api_url,
            poll_interval: Duration::from_secs(poll_secs),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}

fn positive(key: &'static str, secs: u64) -> Result<u64, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: secs.to_string(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(secs)
}
