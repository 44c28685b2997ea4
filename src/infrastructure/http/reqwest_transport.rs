//! `HttpTransport` backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{trace, warn};

use crate::domain::ports::{HttpTransport, TransportError, TransportResponse};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared reqwest client performing plain GET requests.
///
/// Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built (e.g. TLS backend init).
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

fn map_reqwest_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::timeout("request timed out")
    } else if e.is_connect() {
        TransportError::connect(format!("failed to connect: {e}"))
    } else {
        TransportError::other(e.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        trace!(url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "Request failed");
            map_reqwest_error(&e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            warn!(url, status, error = %e, "Failed to read response body");
            map_reqwest_error(&e)
        })?;

        trace!(url, status, bytes = body.len(), "Response received");
        Ok(TransportResponse::new(status, body))
    }
}
