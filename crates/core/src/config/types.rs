use serde::{Deserialize, Serialize};

/// Default push service API root.
pub const DEFAULT_BASE_URL: &str = "https://exp.host/--/api/v2";

/// Maximum (message, recipient) pairs per send request.
pub const PUSH_NOTIFICATION_CHUNK_LIMIT: usize = 100;

/// Maximum ids per receipt request.
pub const PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT: usize = 300;

/// Push client configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// API root; endpoints are resolved below it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Access token sent as a bearer credential (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Recipient limit for one send request (default: 100)
    #[serde(default = "default_push_chunk_limit")]
    pub push_chunk_limit: usize,
    /// Id limit for one receipt request (default: 300)
    #[serde(default = "default_receipt_chunk_limit")]
    pub receipt_chunk_limit: usize,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Cap on requests in flight at once; unset means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_requests: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            push_chunk_limit: default_push_chunk_limit(),
            receipt_chunk_limit: default_receipt_chunk_limit(),
            timeout_secs: default_timeout(),
            max_concurrent_requests: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_push_chunk_limit() -> usize {
    PUSH_NOTIFICATION_CHUNK_LIMIT
}

fn default_receipt_chunk_limit() -> usize {
    PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT
}

fn default_timeout() -> u64 {
    30
}

/// Sanitized config for logging (access token redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub base_url: String,
    pub access_token_configured: bool,
    pub push_chunk_limit: usize,
    pub receipt_chunk_limit: usize,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_requests: Option<usize>,
}

impl From<&ClientConfig> for SanitizedConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            access_token_configured: config
                .access_token
                .as_deref()
                .is_some_and(|t| !t.is_empty()),
            push_chunk_limit: config.push_chunk_limit,
            receipt_chunk_limit: config.receipt_chunk_limit,
            timeout_secs: config.timeout_secs,
            max_concurrent_requests: config.max_concurrent_requests,
        }
    }
}
