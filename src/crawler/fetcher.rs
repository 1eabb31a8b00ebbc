//! HTTP fetcher implementation
//!
//! The crawl engine never talks to `reqwest` directly; it goes through the
//! [`Fetcher`] trait so runs can be driven by a stub in tests. This module
//! holds the trait and the production [`HttpFetcher`]:
//! - Building the HTTP client with timeout and redirect limits
//! - GET requests with caller-supplied headers
//! - Error classification (timeout, network, non-2xx status)

use crate::config::CrawlerConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use thiserror::Error;

/// Maximum redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched resource
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Errors raised while fetching a resource
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
}

/// Retrieves remote resources for the crawl engine
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` with the given request headers
    ///
    /// Non-2xx responses are reported as [`FetchError::Status`].
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<FetchResponse, FetchError>;
}

/// Builds the request headers sent with every crawl request
pub fn request_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(user_agent) {
        Ok(value) => {
            headers.insert(USER_AGENT, value);
        }
        Err(_) => {
            tracing::warn!("User agent {:?} is not a valid header value", user_agent);
        }
    }
    headers
}

/// Builds an HTTP client with proper configuration
///
/// The identifying user agent is sent per request by the engine, so the
/// client only carries transport settings.
///
/// # Example
///
/// ```no_run
/// use crawlerbot::config::CrawlerConfig;
/// use crawlerbot::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;

        Ok(FetchResponse {
            final_url,
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
