//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the shared HTTP client with a browser-like user agent
//! - GET requests with a per-request timeout
//! - Content-Type gating (only HTML is parsed)
//! - Error classification

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching a page or an image
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read body: {0}")]
    Body(String),
}

impl FetchError {
    /// Classifies a reqwest error the same way for pages and images
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error.to_string())
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

/// Result of a successful page fetch
#[derive(Debug)]
pub enum PageFetch {
    /// The page is HTML and its body was read
    Html {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
    },

    /// The response was not HTML; the body was not read
    NotHtml {
        /// The actual Content-Type received
        content_type: String,
    },
}

/// Builds the HTTP client shared by the crawl and download phases
///
/// Redirects follow the reqwest defaults. No cookies are stored. Timeouts are
/// applied per request since pages and images use different limits.
///
/// # Example
///
/// ```no_run
/// use sumi_sieve::crawler::build_http_client;
///
/// let client = build_http_client("Mozilla/5.0").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a GET and rejects non-2xx responses
pub async fn send_get(client: &Client, url: &str, timeout: Duration) -> Result<Response, FetchError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    Ok(response)
}

/// Returns the Content-Type header value, or an empty string
pub fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

/// Fetches a page and returns its body if it is HTML
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `timeout` - Total time allowed for the request and body
///
/// # Returns
///
/// * `Ok(PageFetch::Html)` - Content-Type contains `text/html`
/// * `Ok(PageFetch::NotHtml)` - Any other Content-Type (or none)
/// * `Err(FetchError)` - Network failure, timeout or non-2xx status
pub async fn fetch_page(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<PageFetch, FetchError> {
    let response = send_get(client, url, timeout).await?;
    let final_url = response.url().to_string();

    let content_type = content_type(&response);
    if !content_type.contains("text/html") {
        return Ok(PageFetch::NotHtml { content_type });
    }

    let body = response.text().await.map_err(FetchError::from_reqwest)?;

    Ok(PageFetch::Html { final_url, body })
}
