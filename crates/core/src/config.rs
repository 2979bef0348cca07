use std::{path::PathBuf, time::Duration};

use crate::{
    cache::get_root_cache_dir,
    error::{PinocchioError, Result},
};

pub const API_URL_VAR: &str = "PINOCCHIO_API_URL";
pub const WATCH_URL_VAR: &str = "PINOCCHIO_WATCH_URL";
pub const TIMEOUT_VAR: &str = "PINOCCHIO_HTTP_TIMEOUT_SECS";
pub const CACHE_DIR_VAR: &str = "PINOCCHIO_CACHE_DIR";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_WATCH_URL: &str = "https://www.youtube.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the scoring service, without the `/api/...` path.
    pub api_base_url: String,
    /// Origin serving `/watch?v=...` pages.
    pub watch_base_url: String,
    /// Applied to every outbound HTTP request.
    pub request_timeout: Duration,
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            watch_base_url: DEFAULT_WATCH_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            cache_dir: get_root_cache_dir(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Config::default();

        if let Some(url) = var(API_URL_VAR) {
            config.api_base_url = validated_base_url(API_URL_VAR, &url)?;
        }
        if let Some(url) = var(WATCH_URL_VAR) {
            config.watch_base_url = validated_base_url(WATCH_URL_VAR, &url)?;
        }
        if let Some(secs) = var(TIMEOUT_VAR) {
            let secs: u64 = secs.parse().map_err(|_| PinocchioError::InvalidConfig {
                var: TIMEOUT_VAR.to_string(),
                reason: format!("expected a whole number of seconds, got {secs:?}"),
            })?;
            if secs == 0 {
                return Err(PinocchioError::InvalidConfig {
                    var: TIMEOUT_VAR.to_string(),
                    reason: "timeout must be > 0".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = var(CACHE_DIR_VAR) {
            config.cache_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: &str) -> Result<Self> {
        self.api_base_url = validated_base_url("--api-url", url)?;
        Ok(self)
    }
}

fn validated_base_url(var: &str, raw: &str) -> Result<String> {
    let url = url::Url::parse(raw).map_err(|e| PinocchioError::InvalidConfig {
        var: var.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(PinocchioError::InvalidConfig {
            var: var.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}
