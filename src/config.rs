use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::auth::AccessToken;
use crate::constants::{defaults, envvars};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Gateway settings, read once at startup and never mutated afterwards
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Gate secret. `None` leaves every route open.
    pub pwa_token: Option<AccessToken>,
    pub upstream_base: Url,
    /// Server-side upstream credential; replaces the caller's `Authorization` when set.
    pub upstream_token: Option<AccessToken>,
    pub upstream_timeout: Duration,
    pub listen_addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let upstream_base = var(envvars::UPSTREAM_BASE_URL)
            .ok_or(ConfigError::Missing(envvars::UPSTREAM_BASE_URL))
            .and_then(|v| parse_url(envvars::UPSTREAM_BASE_URL, &v))?;

        let listen_addr = var(envvars::LISTEN_ADDR)
            .unwrap_or_else(|| defaults::LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: envvars::LISTEN_ADDR,
                reason: e.to_string(),
            })?;

        Ok(Self {
            pwa_token: var(envvars::PWA_ACCESS_TOKEN).and_then(AccessToken::new),
            upstream_base,
            upstream_token: var(envvars::UPSTREAM_API_TOKEN).and_then(AccessToken::new),
            upstream_timeout: secs_or(envvars::UPSTREAM_TIMEOUT_SECS, defaults::UPSTREAM_TIMEOUT)?,
            listen_addr,
            static_dir: var(envvars::STATIC_DIR).map(PathBuf::from),
        })
    }
}

/// Dashboard client settings
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    pub cache_version: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// `base_url` overrides the environment when given (e.g. from the command line).
    pub fn from_env(base_url: Option<String>) -> Result<Self, ConfigError> {
        let base_url = base_url
            .or_else(|| var(envvars::DASHBOARD_BASE_URL))
            .unwrap_or_else(|| defaults::DASHBOARD_BASE_URL.to_string());

        Ok(Self {
            base_url: parse_url(envvars::DASHBOARD_BASE_URL, &base_url)?,
            cache_version: var(envvars::CACHE_VERSION)
                .unwrap_or_else(|| defaults::CACHE_VERSION.to_string()),
            poll_interval: secs_or(envvars::POLL_INTERVAL_SECS, defaults::POLL_INTERVAL)?,
            request_timeout: secs_or(envvars::UPSTREAM_TIMEOUT_SECS, defaults::UPSTREAM_TIMEOUT)?,
        })
    }
}

// Unset and blank variables are treated the same
fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn secs_or(var_name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match var(var_name) {
        None => Ok(default),
        Some(v) => v
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::Invalid {
                var: var_name,
                reason: e.to_string(),
            }),
    }
}
