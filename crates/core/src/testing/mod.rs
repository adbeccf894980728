//! Testing utilities: a mock transport and response fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use expo_push_core::{ClientConfig, PushClient};
//! use expo_push_core::testing::{fixtures, MockTransport};
//!
//! let transport = Arc::new(MockTransport::new());
//! let client = PushClient::with_transport(ClientConfig::default(), transport.clone());
//!
//! // By default every recipient gets an ok ticket.
//! let batches = client.send_push_notifications(&[fixtures::message(1)]);
//! ```

mod mock_transport;

pub use mock_transport::{MockTransport, RecordedRequest, Responder};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Map, Value};

    use crate::message::PushMessage;
    use crate::transport::TransportError;

    /// A syntactically valid push token.
    pub fn push_token(n: usize) -> String {
        format!("ExponentPushToken[device-{}]", n)
    }

    /// A message to a single device.
    pub fn message(n: usize) -> PushMessage {
        PushMessage::new(push_token(n))
            .with_title("Hello")
            .with_body(format!("Message {}", n))
    }

    /// A message to `count` devices numbered from `first`.
    pub fn message_to_many(first: usize, count: usize) -> PushMessage {
        PushMessage::to_many((first..first + count).map(push_token)).with_title("Hello")
    }

    /// Receipt id the fixture responders assign to a recipient.
    pub fn receipt_id_for(token: &str) -> String {
        format!("receipt-{}", token)
    }

    /// Recipient tokens of every message in a send request body, in order.
    pub fn request_recipients(body: &str) -> Result<Vec<String>, TransportError> {
        let messages: Vec<Value> = serde_json::from_str(body)
            .map_err(|e| TransportError::Io(format!("request body is not a JSON array: {}", e)))?;

        Ok(messages
            .iter()
            .flat_map(|m| match &m["to"] {
                Value::String(token) => vec![token.clone()],
                Value::Array(tokens) => tokens
                    .iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            })
            .collect())
    }

    /// A send response with one ok ticket per recipient in `body`.
    pub fn ticket_response_for(body: &str) -> Result<String, TransportError> {
        let tickets: Vec<Value> = request_recipients(body)?
            .iter()
            .map(|token| json!({ "status": "ok", "id": receipt_id_for(token) }))
            .collect();
        Ok(json!({ "data": tickets }).to_string())
    }

    /// A send response like [`ticket_response_for`], except recipients for
    /// which `unregistered` returns true get a `DeviceNotRegistered` ticket.
    pub fn ticket_response_with_unregistered(
        body: &str,
        unregistered: impl Fn(&str) -> bool,
    ) -> Result<String, TransportError> {
        let tickets: Vec<Value> = request_recipients(body)?
            .iter()
            .map(|token| {
                if unregistered(token) {
                    json!({
                        "status": "error",
                        "message": format!("\"{}\" is not a registered push notification recipient", token),
                        "details": { "error": "DeviceNotRegistered", "expoPushToken": token }
                    })
                } else {
                    json!({ "status": "ok", "id": receipt_id_for(token) })
                }
            })
            .collect();
        Ok(json!({ "data": tickets }).to_string())
    }

    /// A receipts response containing the given entries.
    pub fn receipt_response(entries: &[(&str, Value)]) -> String {
        let data: Map<String, Value> = entries
            .iter()
            .map(|(id, receipt)| (id.to_string(), receipt.clone()))
            .collect();
        json!({ "data": data }).to_string()
    }

    /// A receipts response with an ok receipt for every id in `body`.
    pub fn ok_receipts_for(body: &str) -> Result<String, TransportError> {
        let request: Value = serde_json::from_str(body)
            .map_err(|e| TransportError::Io(format!("request body is not JSON: {}", e)))?;
        let data: Map<String, Value> = request["ids"]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(|id| (id.to_string(), json!({ "status": "ok" })))
                    .collect()
            })
            .unwrap_or_default();
        Ok(json!({ "data": data }).to_string())
    }
}
