//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the pipeline, including:
//! - Building the HTTP client with timeouts and a redirect limit
//! - Attaching a rotated header set to every request
//! - Separating transport failures from HTTP error responses
//!
//! The fetcher never retries; re-attempts are decided by the coordinator so
//! that every URL's outcome is accounted for in one place.

use crate::config::FetcherConfig;
use crate::pipeline::headers::HeaderProvider;
use crate::state::TransportErrorKind;
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;

/// Raw result of one GET request
///
/// Non-2xx responses are returned as-is; only failures that produced no HTTP
/// response at all set `transport_error`.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status code (0 when no response was received)
    pub status_code: u16,
    /// Final URL after redirects
    pub final_url: String,
    /// Response body
    pub body: Vec<u8>,
    /// Set when the request failed below the HTTP layer
    pub transport_error: Option<TransportErrorKind>,
}

impl FetchResult {
    /// A fetch that received a response
    pub fn response(status_code: u16, final_url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            status_code,
            final_url: final_url.into(),
            body,
            transport_error: None,
        }
    }

    /// A fetch that never received a response
    pub fn transport(url: impl Into<String>, kind: TransportErrorKind) -> Self {
        Self {
            status_code: 0,
            final_url: url.into(),
            body: Vec::new(),
            transport_error: Some(kind),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use race_harvest::config::FetcherConfig;
/// use race_harvest::pipeline::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests with rotated headers
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    headers: Arc<dyn HeaderProvider>,
}

impl Fetcher {
    /// Creates a fetcher with its own client
    pub fn new(
        config: &FetcherConfig,
        headers: Arc<dyn HeaderProvider>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, headers))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, headers: Arc<dyn HeaderProvider>) -> Self {
        Self { client, headers }
    }

    /// Fetches a URL
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Any HTTP status | status, final URL and body returned |
    /// | Timeout | `TransportErrorKind::Timeout` |
    /// | Connection refused / DNS / TLS | `TransportErrorKind::Connect` |
    /// | Redirect chain over the limit | `TransportErrorKind::Redirect` |
    /// | Body read failed | `TransportErrorKind::Body` |
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let response = match self
            .client
            .get(url)
            .headers(self.headers.headers())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let kind = TransportErrorKind::from_reqwest(&e);
                tracing::debug!("Transport failure ({}) for {}: {}", kind, url, e);
                return FetchResult::transport(url, kind);
            }
        };

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        match response.bytes().await {
            Ok(body) => FetchResult::response(status_code, final_url, body.to_vec()),
            Err(e) => {
                let kind = TransportErrorKind::from_reqwest(&e);
                tracing::debug!("Failed to read body of {}: {}", url, e);
                FetchResult::transport(final_url, kind)
            }
        }
    }

    /// Fetches a URL and returns its body as text when the server answered 200
    ///
    /// Used by URL discovery, where anything but a successful index page is
    /// simply reported back to the caller.
    pub async fn fetch_text(&self, url: &str) -> Result<String, String> {
        let result = self.fetch(url).await;
        if let Some(kind) = result.transport_error {
            return Err(format!("transport failure ({})", kind));
        }
        if result.status_code != 200 {
            return Err(format!("HTTP {}", result.status_code));
        }
        Ok(String::from_utf8_lossy(&result.body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&FetcherConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_transport_result_has_no_status() {
        let result = FetchResult::transport("https://example.com/", TransportErrorKind::Timeout);
        assert_eq!(result.status_code, 0);
        assert!(result.body.is_empty());
        assert_eq!(result.transport_error, Some(TransportErrorKind::Timeout));
    }

    // Live fetch behavior is exercised with wiremock in the integration tests
}
