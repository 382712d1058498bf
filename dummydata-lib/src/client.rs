//! Main PreviewClient

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use url::Url;

use crate::error::ApiError;

/// HTTP client for the generation/export backend.
///
/// This client is cheap to clone (uses `Arc` internally), so request tasks
/// can each hold their own handle.
///
/// # Example
///
/// ```ignore
/// use dummydata_lib::PreviewClient;
///
/// let client = PreviewClient::builder()
///     .url("http://127.0.0.1:5000")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
#[derive(Clone)]
pub struct PreviewClient {
    inner: Arc<PreviewClientInner>,
}

struct PreviewClientInner {
    base_url: Url,
    http_client: Client,
    timeout: Option<Duration>,
}

impl PreviewClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> PreviewClientBuilder<Missing> {
        PreviewClientBuilder::new()
    }

    /// Returns the backend base URL.
    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    /// Returns the per-request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.inner.timeout
    }

    /// Resolves an endpoint path against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Starts a POST request to an endpoint with the configured timeout.
    pub(crate) fn post(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let mut request = self.inner.http_client.post(url);
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }
        Ok(request)
    }

    /// Sends a request, mapping timeouts to [`ApiError::Timeout`].
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(|e| self.map_error(e))
    }

    pub(crate) fn map_error(&self, error: reqwest::Error) -> ApiError {
        match self.inner.timeout {
            Some(timeout) if error.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::Network(error),
        }
    }
}

impl std::fmt::Debug for PreviewClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`PreviewClient`].
///
/// The backend URL is required and enforced at compile time.
pub struct PreviewClientBuilder<U> {
    url: U,
    timeout: Option<Duration>,
}

impl PreviewClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            timeout: None,
        }
    }

    /// Sets the backend base URL, e.g. `http://127.0.0.1:5000`.
    pub fn url(self, url: impl Into<String>) -> PreviewClientBuilder<Set<String>> {
        PreviewClientBuilder {
            url: Set(url.into()),
            timeout: self.timeout,
        }
    }
}

impl Default for PreviewClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> PreviewClientBuilder<U> {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl PreviewClientBuilder<Set<String>> {
    /// Builds the [`PreviewClient`].
    ///
    /// Fails if the URL cannot be parsed or the HTTP client cannot be built.
    pub fn build(self) -> Result<PreviewClient, ApiError> {
        let mut raw = self.url.0;
        // Endpoints are joined relative to the base, which needs a trailing slash.
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url =
            Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;

        let http_client = Client::builder().build()?;

        Ok(PreviewClient {
            inner: Arc::new(PreviewClientInner {
                base_url,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
