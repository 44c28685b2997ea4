//! HTTP transport port definition.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Raw response of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Broad category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request did not finish in time.
    Timeout,
    /// No connection could be established.
    Connect,
    /// Anything else (DNS, TLS, body read, invalid URL).
    Other,
}

/// A request that never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    /// Creates a transport error of the given kind.
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    /// Creates connect error.
    #[must_use]
    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }

    /// Creates uncategorized error.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Other, message)
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> TransportErrorKind {
        self.kind
    }
}

/// Port for issuing GET requests.
/// Implementations must be thread-safe; timeouts are their business.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs a GET request and returns status and body.
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use tokio::sync::Semaphore;

    /// Encodes a blank PNG of the given size.
    pub fn png_body(width: u32, height: u32) -> Bytes {
        let mut buf = Vec::new();
        image::DynamicImage::new_rgb8(width, height)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode png");
        Bytes::from(buf)
    }

    type Canned = Result<TransportResponse, TransportError>;

    /// Stub transport serving canned responses.
    ///
    /// When gated, every request parks until [`StubTransport::release`] hands
    /// out a permit, which lets tests pile up concurrent callers on one fetch.
    pub struct StubTransport {
        routes: Mutex<HashMap<String, Canned>>,
        fallback: Canned,
        gate: Option<Semaphore>,
        requests: Mutex<Vec<String>>,
        aborted: AtomicUsize,
    }

    struct InFlight<'a> {
        aborted: &'a AtomicUsize,
        finished: bool,
    }

    impl Drop for InFlight<'_> {
        fn drop(&mut self) {
            if !self.finished {
                self.aborted.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    impl StubTransport {
        /// Creates a stub answering every URL with `fallback`.
        pub fn new(fallback: Canned) -> Self {
            Self {
                routes: Mutex::new(HashMap::new()),
                fallback,
                gate: None,
                requests: Mutex::new(Vec::new()),
                aborted: AtomicUsize::new(0),
            }
        }

        /// Creates a stub answering every URL with `status` and `body`.
        pub fn respond(status: u16, body: impl Into<Bytes>) -> Self {
            Self::new(Ok(TransportResponse::new(status, body)))
        }

        /// Creates a stub serving a small PNG for every URL.
        pub fn serving_png() -> Self {
            Self::respond(200, png_body(2, 2))
        }

        /// Creates a stub failing every request.
        pub fn failing(error: TransportError) -> Self {
            Self::new(Err(error))
        }

        /// Answers `url` with a specific result.
        #[must_use]
        pub fn with_route(self, url: &str, result: Canned) -> Self {
            self.routes.lock().insert(url.to_owned(), result);
            self
        }

        /// Holds every request until released.
        #[must_use]
        pub fn gated(mut self) -> Self {
            self.gate = Some(Semaphore::new(0));
            self
        }

        /// Lets `count` parked requests complete.
        pub fn release(&self, count: usize) {
            if let Some(gate) = &self.gate {
                gate.add_permits(count);
            }
        }

        /// Total requests started.
        pub fn calls(&self) -> usize {
            self.requests.lock().len()
        }

        /// Requests started for `url`.
        pub fn calls_for(&self, url: &str) -> usize {
            self.requests.lock().iter().filter(|u| *u == url).count()
        }

        /// Requests dropped before they completed.
        pub fn aborted(&self) -> usize {
            self.aborted.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for StubTransport {
        async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
            self.requests.lock().push(url.to_owned());
            let mut flight = InFlight {
                aborted: &self.aborted,
                finished: false,
            };

            if let Some(gate) = &self.gate {
                gate.acquire()
                    .await
                    .map_err(|_| TransportError::other("gate closed"))?
                    .forget();
            }
            flight.finished = true;

            self.routes
                .lock()
                .get(url)
                .cloned()
                .unwrap_or_else(|| self.fallback.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(304, "").is_success());
        assert!(!TransportResponse::new(404, "").is_success());
        assert!(!TransportResponse::new(199, "").is_success());
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            TransportError::connect("refused").kind(),
            TransportErrorKind::Connect
        );
        assert_eq!(TransportError::other("dns").to_string(), "dns");
    }
}
