//! Client configuration
//!
//! Settings resolve in three layers: built-in defaults, then environment
//! variables ([`ClientConfig::from_env`]), then explicit `with_*` overrides.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Error, Result};

/// Public OpenML XML API endpoint
pub const DEFAULT_SERVER: &str = "https://www.openml.org/api/v1/xml";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable overriding the server base URL
pub const ENV_SERVER: &str = "OPENML_SERVER";

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "OPENML_APIKEY";

/// Environment variable overriding the timeout (seconds)
pub const ENV_TIMEOUT_SECS: &str = "OPENML_TIMEOUT_SECS";

/// Connection settings for [`HttpTransport`](crate::transport::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    server: String,
    api_key: Option<String>,
    timeout_secs: u64,
    user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("openml-evaluations/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from defaults overridden by `OPENML_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `OPENML_TIMEOUT_SECS` is not an integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse a configuration from JSON; absent keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] on malformed JSON and [`Error::Config`] if the
    /// resulting settings are invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(server) = lookup(ENV_SERVER).filter(|s| !s.trim().is_empty()) {
            config.server = server;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|s| !s.trim().is_empty()) {
            config.api_key = Some(key);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw.trim().parse().map_err(|e| {
                Error::Config(format!("{ENV_TIMEOUT_SECS}={raw:?} is not a number: {e}"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the server base URL.
    #[must_use]
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Set the API key sent with each request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Server base URL without a trailing slash.
    #[must_use]
    pub fn server(&self) -> &str {
        self.server.trim_end_matches('/')
    }

    /// API key, if configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// User-Agent header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Check the settings can form requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty or non-HTTP server URL, or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        let server = self.server();
        if server.is_empty() {
            return Err(Error::Config("server URL is empty".to_string()));
        }
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(Error::Config(format!(
                "server URL must start with http:// or https://, got {server:?}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout must be at least one second".to_string()));
        }
        Ok(())
    }
}
