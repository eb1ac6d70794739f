// Client configuration
// Defaults, then CODEPAD_* environment variables, then CLI flags on top

use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_LANGUAGE: &str = "go";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_POLLS: u32 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "CODEPAD_API_URL";
pub const ENV_LANGUAGE: &str = "CODEPAD_LANGUAGE";
pub const ENV_POLL_INTERVAL_MS: &str = "CODEPAD_POLL_INTERVAL_MS";
pub const ENV_MAX_POLLS: &str = "CODEPAD_MAX_POLLS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CODEPAD_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub language: String,
    pub poll_interval_ms: u64,
    /// Status checks allowed per job before the client gives up on it
    pub max_polls: u32,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_polls: DEFAULT_MAX_POLLS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns
    /// Unparsable numbers are logged and ignored
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(language) = lookup(ENV_LANGUAGE).filter(|v| !v.trim().is_empty()) {
            config.language = language.trim().to_lowercase();
        }
        if let Some(ms) = parse_var(&lookup, ENV_POLL_INTERVAL_MS) {
            config.poll_interval_ms = ms;
        }
        if let Some(max) = parse_var(&lookup, ENV_MAX_POLLS) {
            config.max_polls = max;
        }
        if let Some(secs) = parse_var(&lookup, ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout_secs = secs;
        }

        config
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = %raw, "Ignoring unparsable configuration value");
            None
        }
    }
}
