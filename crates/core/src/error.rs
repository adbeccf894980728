//! Batch-level errors of the push client.
//!
//! Per-recipient failures reported by the service are not errors here: they
//! arrive as error tickets or receipts inside a successful batch.

use serde::Deserialize;
use thiserror::Error;

use crate::transport::TransportError;

/// Request-level error entry returned instead of `data`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Errors that fail a single batch.
#[derive(Debug, Error)]
pub enum PushError {
    /// The request never produced a response body.
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),

    /// A body came back but did not have the expected shape.
    #[error("Malformed push service response: {message}")]
    Protocol { message: String, body: String },

    /// The service rejected the whole request.
    #[error("Push service rejected the request: {summary}")]
    Api {
        summary: String,
        errors: Vec<ApiError>,
    },

    /// The batch could not be encoded.
    #[error("Failed to serialize request: {0}")]
    Serialize(String),

    /// The batch was aborted before it finished.
    #[error("Batch was cancelled")]
    Cancelled,

    /// The task driving the batch panicked or could not run.
    #[error("Batch task failed: {0}")]
    Task(String),
}

impl PushError {
    pub(crate) fn protocol(message: impl Into<String>, body: &str) -> Self {
        Self::Protocol {
            message: message.into(),
            body: body.to_string(),
        }
    }

    pub(crate) fn api(errors: Vec<ApiError>) -> Self {
        let summary = errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Self::Api { summary, errors }
    }

    /// Short label used for logging and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Protocol { .. } => "protocol",
            Self::Api { .. } => "api",
            Self::Serialize(_) => "serialize",
            Self::Cancelled => "cancelled",
            Self::Task(_) => "task",
        }
    }

    /// Raw body of a response that could not be decoded.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::Protocol { body, .. } => Some(body),
            _ => None,
        }
    }
}
