//! HTTP client abstraction for testability

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};

use super::types::FetchError;

/// A fully rendered tile request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    /// Absolute URL
    pub url: String,
    /// HTTP method, upper case
    pub method: String,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Request body, sent only when present
    pub body: Option<String>,
    /// Content type of the body
    pub content_type: Option<String>,
}

impl TileRequest {
    /// Creates a `GET` request without headers or body.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: Vec::new(),
            body: None,
            content_type: None,
        }
    }
}

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Executes a request and returns the response body.
    ///
    /// Implementations must reject non-success statuses, empty bodies and
    /// responses served from a different URL than requested.
    fn execute(&self, request: &TileRequest) -> Result<Vec<u8>, FetchError>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(crate::config::DEFAULT_HTTP_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("nowcaster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn execute(&self, request: &TileRequest) -> Result<Vec<u8>, FetchError> {
        let url = Url::parse(&request.url)
            .map_err(|e| FetchError::InvalidRequest(format!("{}: {}", request.url, e)))?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| FetchError::InvalidRequest(format!("method '{}'", request.method)))?;

        let mut builder = self.client.request(method, url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            if let Some(content_type) = &request.content_type {
                builder = builder.header(CONTENT_TYPE, content_type.as_str());
            }
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .map_err(|e| FetchError::Http(format!("Request to {} failed: {}", request.url, e)))?;

        // Check HTTP status
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: request.url.clone(),
            });
        }

        // Redirects are followed by the client; only the requested endpoint is trusted
        if response.url() != &url {
            return Err(FetchError::UnexpectedEndpoint {
                requested: request.url.clone(),
                responded: response.url().to_string(),
            });
        }

        // Read response body
        let body = response
            .bytes()
            .map_err(|e| FetchError::Http(format!("Failed to read response: {}", e)))?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody {
                url: request.url.clone(),
            });
        }

        Ok(body.to_vec())
    }
}
