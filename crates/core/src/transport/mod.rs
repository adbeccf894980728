//! The network collaborator: one JSON POST in, one response body out.

mod http;

pub use http::ReqwestTransport;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised before a complete response body is available.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other I/O level failure.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Posts a JSON body and resolves with the full response body.
///
/// Implementations must fail rather than return a partial body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &str, body: String) -> Result<String, TransportError>;
}
