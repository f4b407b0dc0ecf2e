//! Client configuration

use serde::Deserialize;
use std::env;

/// Connection settings for the remote document service.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        ClientConfig {
            base_url: env::var("LEGAJO_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            timeout_secs: env::var("LEGAJO_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}
