//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, warn};

use super::{Transport, TransportError};
use crate::config::ClientConfig;

/// Transport sharing one pooled `reqwest::Client` across all requests.
pub struct ReqwestTransport {
    client: Client,
    access_token: Option<String>,
}

impl ReqwestTransport {
    /// Create a transport from client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, url: &str, body: String) -> Result<String, TransportError> {
        debug!(url, bytes = body.len(), "POST push service");

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .header(ACCEPT, "application/json")
            .body(body);

        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        // Request-level rejections come back as a JSON `errors` body with a
        // 4xx status; the caller decodes them.
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Push service returned non-success status");
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ignores_empty_access_token() {
        let config = ClientConfig {
            access_token: Some(String::new()),
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        assert!(transport.access_token.is_none());
    }

    #[tokio::test]
    async fn test_post_to_unreachable_host_fails() {
        let config = ClientConfig {
            timeout_secs: 2,
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let result = transport
            .post("http://127.0.0.1:9/push/send", "[]".to_string())
            .await;
        assert!(matches!(result, Err(TransportError::Http(_))));
    }
}
