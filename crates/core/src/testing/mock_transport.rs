//! Mock transport for testing.

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fixtures;
use crate::transport::{Transport, TransportError};

/// Computes a response body from `(url, request_body)`.
pub type Responder = Arc<dyn Fn(&str, &str) -> Result<String, TransportError> + Send + Sync>;

/// A recorded request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: String,
}

/// Mock implementation of the Transport trait.
///
/// Provides controllable behavior for testing:
/// - Answer with a custom responder, or by default synthesize an ok ticket
///   per recipient and an empty receipt map
/// - Track requests for assertions
/// - Simulate failures and slow responses
pub struct MockTransport {
    /// Custom responder; falls back to the fixture responder when unset.
    responder: Arc<RwLock<Option<Responder>>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    /// If set, the next request will fail with this error.
    next_error: Arc<RwLock<Option<TransportError>>>,
    /// Artificial latency applied to every request.
    delay: Arc<RwLock<Option<Duration>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("max_in_flight", &self.max_in_flight.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl MockTransport {
    /// Create a new mock transport with fixture responses.
    pub fn new() -> Self {
        Self {
            responder: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Create a mock that answers every request with `responder`.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&str, &str) -> Result<String, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(RwLock::new(Some(Arc::new(responder)))),
            ..Self::new()
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the responder.
    pub async fn set_responder(&self, responder: Responder) {
        *self.responder.write().await = Some(responder);
    }

    /// Answer every request with the same body.
    pub async fn set_fixed_response(&self, body: impl Into<String>) {
        let body = body.into();
        self.set_responder(Arc::new(move |_: &str, _: &str| Ok(body.clone())))
            .await;
    }

    /// Delay every response by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    // =========================================================================
    // Request Recording
    // =========================================================================

    /// Get all recorded requests.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of requests performed.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Clear recorded requests.
    pub async fn clear_recorded(&self) {
        self.requests.write().await.clear();
    }

    /// Highest number of requests observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next request to fail with the given error.
    pub async fn set_next_error(&self, error: TransportError) {
        *self.next_error.write().await = Some(error);
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<TransportError> {
        self.next_error.write().await.take()
    }

    fn default_response(url: &str, body: &str) -> Result<String, TransportError> {
        if url.ends_with("/push/getReceipts") {
            Ok(r#"{"data":{}}"#.to_string())
        } else {
            fixtures::ticket_response_for(body)
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, url: &str, body: String) -> Result<String, TransportError> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        self.requests.write().await.push(RecordedRequest {
            url: url.to_string(),
            body: body.clone(),
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = match self.take_error().await {
            Some(err) => Err(err),
            None => {
                let responder = self.responder.read().await.clone();
                match responder {
                    Some(responder) => responder(url, &body),
                    None => Self::default_response(url, &body),
                }
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
