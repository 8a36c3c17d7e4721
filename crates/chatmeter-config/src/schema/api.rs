//! Remote API connection settings.

use std::fmt;

use chatmeter_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable consulted when `api.api_key` is unset.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// API connection configuration.
///
/// Timeouts are applied to the HTTP client as-is. No request is ever retried.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    /// TCP connect timeout in seconds (valid range: 1-600).
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (valid range: 1-600).
    pub request_timeout_secs: u64,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

impl ApiConfig {
    /// Resolve the API key: the configured value first, then `OPENAI_API_KEY`.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key_from(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key_from(&self, env_value: Option<String>) -> Result<String, ConfigError> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| env_value.filter(|key| !key.trim().is_empty()))
            .ok_or(ConfigError::MissingApiKey(API_KEY_ENV))
    }
}
