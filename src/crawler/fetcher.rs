//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests that race the pipeline's cancellation token
//! - Error classification into [`FetchError`]

use crate::config::UserAgentConfig;
use crate::crawler::ByteStream;
use crate::{DeadlineExceeded, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Source of response bodies
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns its body
    ///
    /// Implementations must return promptly once `cancel` fires. A non-2xx
    /// status is an error, never a body.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<ByteStream, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Timeout applied to every request
///
/// # Example
///
/// ```no_run
/// use linkscrape::config::UserAgentConfig;
/// use linkscrape::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<ByteStream, FetchError> {
        let request = self
            .client
            .get(url)
            .build()
            .map_err(|e| FetchError::new(url, "failed to create request").with_source(e))?;

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(FetchError::new(url, "cancelled before response").with_source(DeadlineExceeded));
            }
            response = self.client.execute(request) => {
                response.map_err(|e| classify_transport_error(url, e))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            // The response is dropped here, which closes its body
            return Err(FetchError::new(url, "unexpected HTTP status").with_status(status.as_u16()));
        }

        tracing::trace!(url, status = status.as_u16(), "Response headers received");
        Ok(ByteStream::from_response(url, response, cancel.clone()))
    }
}

fn classify_transport_error(url: &str, err: reqwest::Error) -> FetchError {
    let reason = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "failed to execute HTTP request"
    };

    let status = err.status().map(|s| s.as_u16()).unwrap_or(0);
    FetchError::new(url, reason).with_status(status).with_source(err)
}
