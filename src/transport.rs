//! HTTP transport
//!
//! ```text
//! OpenMlClient ──get("evaluation/list/...")──> Transport
//!                                                 │
//!                           GET {server}/{endpoint}?api_key=...
//!                                                 │
//!                                          HttpResponse { status, body }
//! ```
//!
//! The client interprets status codes and error documents; a transport only
//! moves bytes. Tests substitute their own [`Transport`].

use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::Result;

/// Raw response returned by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body decoded as text
    pub body: String,
}

impl HttpResponse {
    /// Create a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Create a `200 OK` response.
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Blocking GET against the API.
pub trait Transport {
    /// Perform `GET {server}/{endpoint}`.
    ///
    /// Non-success statuses are returned as responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response could be obtained.
    fn get(&self, endpoint: &str) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, endpoint: &str) -> Result<HttpResponse> {
        (**self).get(endpoint)
    }
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create a transport for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for invalid settings and
    /// [`Error::Transport`](crate::Error::Transport) if the client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()?;

        debug!(server = config.server(), authenticated = config.api_key().is_some(), "Created HTTP transport");

        Ok(Self { client, config })
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL for an endpoint, without the API key.
    #[must_use]
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.server(), endpoint.trim_start_matches('/'))
    }
}

impl Transport for HttpTransport {
    fn get(&self, endpoint: &str) -> Result<HttpResponse> {
        let url = self.url_for(endpoint);
        let mut request = self.client.get(&url);
        if let Some(key) = self.config.api_key() {
            request = request.query(&[("api_key", key)]);
        }

        let response = request.send().map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            e
        })?;
        let status = response.status().as_u16();
        let body = response.text()?;

        debug!(url = %url, status, bytes = body.len(), "Received response");

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_cleanly() {
        let transport =
            HttpTransport::new(ClientConfig::new().with_server("https://example.org/api/v1/xml/"))
                .unwrap();
        assert_eq!(
            transport.url_for("/evaluationmeasure/list"),
            "https://example.org/api/v1/xml/evaluationmeasure/list"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = HttpTransport::new(ClientConfig::new().with_server("")).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::ok("x").is_success());
        assert!(!HttpResponse::new(412, "x").is_success());
        assert!(!HttpResponse::new(199, "x").is_success());
    }
}
