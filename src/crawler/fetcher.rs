//! HTTP fetcher implementation
//!
//! This module handles feed page requests for the crawler:
//! - Building the shared HTTP client with the identifying user agent
//! - GET requests with a per-request timeout
//! - Collapsing every failure into a single `FetchError`
//!
//! Image downloads reuse the same client but stream their bodies; see
//! `downloader.rs`.

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Any reason a page could not be fetched
///
/// The crawl treats all variants the same way; they are kept apart only so
/// the logs say what happened.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    /// Classifies a reqwest error by its cause
    pub(crate) fn from_reqwest(url: &Url, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = e.status() {
            Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else if e.is_connect() {
            Self::Network {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// Source of feed page bodies
///
/// The crawler never talks to reqwest directly for pages, so tests and
/// alternate transports can stand in for the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one page and returns its body as text
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// The client carries the identifying user agent and pools connections
/// across every page and image request of a session. Timeouts are applied
/// per request so pages and images can use different limits.
///
/// # Example
///
/// ```no_run
/// use feed_gleaner::config::UserAgentConfig;
/// use feed_gleaner::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "FeedGleaner".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches feed pages over HTTP
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Sends a GET and returns the body of a 2xx response
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | body text |
    /// | any other status | `FetchError::Status` |
    /// | timeout | `FetchError::Timeout` |
    /// | connection/TLS/body error | `FetchError::Network` |
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}
