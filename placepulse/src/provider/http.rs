//! HTTP client abstraction for testability.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

/// Default timeout for search requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur while fetching a page over HTTP.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// The request failed before a response body was read (DNS,
    /// connection, timeout, stream error).
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success status code.
    #[error("HTTP status {0}")]
    Status(u16),
}

/// Trait for issuing a single GET request and reading the body as text.
///
/// This abstraction allows dependency injection of scripted clients in
/// tests instead of talking to the real endpoint.
pub trait SearchClient: Send + Sync + 'static {
    /// Performs an HTTP GET request and returns the response body.
    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, FetchError>> + Send + 'a>>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestSearchClient {
    client: reqwest::Client,
}

impl ReqwestSearchClient {
    /// Creates a new client with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl SearchClient for ReqwestSearchClient {
    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            response
                .text()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))
        })
    }
}
