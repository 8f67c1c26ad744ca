//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for a MediaWiki Action API endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full URL of `api.php`
    pub endpoint: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Bot account; the password is supplied separately
    pub username: Option<String>,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With API endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: "ProgrammingBot <https://en.wikipedia.org/wiki/User:ProgrammingBot>"
                .to_string(),
            timeout_secs: 30,
            username: Some("ProgrammingBot".to_string()),
        }
    }
}
