//! Response decoding for the send and receipt endpoints.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ApiError, PushError};
use crate::response::{PushReceipt, PushTicket, ReceiptStatus, TicketStatus};

/// Top-level response shape shared by both endpoints.
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<ApiError>>,
}

fn unwrap_envelope<T: DeserializeOwned>(body: &str) -> Result<T, PushError> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| PushError::protocol(format!("failed to parse response: {}", e), body))?;

    match envelope {
        Envelope {
            data: Some(data), ..
        } => Ok(data),
        Envelope {
            errors: Some(errors),
            ..
        } if !errors.is_empty() => Err(PushError::api(errors)),
        _ => Err(PushError::protocol(
            "response has neither data nor errors",
            body,
        )),
    }
}

/// Decode a send response and tag each ticket with its (message, recipient).
///
/// `recipients` is the batch flattened in submission order; the service emits
/// exactly one ticket per entry, in the same order.
pub(crate) fn decode_tickets(
    body: &str,
    recipients: &[(usize, String)],
) -> Result<Vec<PushTicket>, PushError> {
    let statuses: Vec<TicketStatus> = unwrap_envelope(body)?;

    if statuses.len() != recipients.len() {
        return Err(PushError::protocol(
            format!(
                "expected {} tickets, received {}",
                recipients.len(),
                statuses.len()
            ),
            body,
        ));
    }

    Ok(recipients
        .iter()
        .zip(statuses)
        .map(|((message_index, recipient), status)| PushTicket {
            message_index: *message_index,
            recipient: recipient.clone(),
            status,
        })
        .collect())
}

/// Decode a receipts response keyed by receipt id.
pub(crate) fn decode_receipts(body: &str) -> Result<HashMap<String, PushReceipt>, PushError> {
    let statuses: HashMap<String, ReceiptStatus> = unwrap_envelope(body)?;

    Ok(statuses
        .into_iter()
        .map(|(id, status)| (id.clone(), PushReceipt { id, status }))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::PushErrorCode;

    fn recipients(tokens: &[(usize, &str)]) -> Vec<(usize, String)> {
        tokens.iter().map(|(i, t)| (*i, t.to_string())).collect()
    }

    #[test]
    fn test_decode_tickets_tags_recipients_in_order() {
        let body = r#"{"data":[
            {"status":"ok","id":"r-1"},
            {"status":"error","message":"gone","details":{"error":"DeviceNotRegistered"}},
            {"status":"ok","id":"r-3"}
        ]}"#;
        let tickets =
            decode_tickets(body, &recipients(&[(0, "a"), (2, "b"), (2, "c")])).unwrap();

        assert_eq!(tickets.len(), 3);
        assert_eq!(tickets[0].receipt_id(), Some("r-1"));
        assert_eq!(tickets[1].message_index, 2);
        assert_eq!(tickets[1].recipient, "b");
        assert_eq!(
            tickets[1].error_code(),
            Some(&PushErrorCode::DeviceNotRegistered)
        );
        assert_eq!(tickets[1].failed_token(), Some("b"));
        assert_eq!(tickets[2].recipient, "c");
    }

    #[test]
    fn test_decode_tickets_count_mismatch_is_protocol_error() {
        let body = r#"{"data":[{"status":"ok","id":"r-1"}]}"#;
        let err = decode_tickets(body, &recipients(&[(0, "a"), (1, "b")])).unwrap_err();
        assert!(matches!(err, PushError::Protocol { .. }));
        assert_eq!(err.raw_body(), Some(body));
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = decode_tickets("<html>502</html>", &recipients(&[(0, "a")])).unwrap_err();
        assert!(matches!(err, PushError::Protocol { .. }));
        assert_eq!(err.raw_body(), Some("<html>502</html>"));
    }

    #[test]
    fn test_decode_request_level_errors() {
        let body = r#"{"errors":[{"code":"PUSH_TOO_MANY_EXPERIENCE_IDS","message":"mixed projects"}]}"#;
        let err = decode_tickets(body, &recipients(&[(0, "a")])).unwrap_err();
        match err {
            PushError::Api { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].code, "PUSH_TOO_MANY_EXPERIENCE_IDS");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_object_is_protocol_error() {
        let err = decode_receipts("{}").unwrap_err();
        assert!(matches!(err, PushError::Protocol { .. }));
    }

    #[test]
    fn test_decode_receipts_keyed_by_id() {
        let body = r#"{"data":{
            "a":{"status":"ok"},
            "b":{"status":"error","message":"nope","details":{"error":"MessageRateExceeded"}}
        }}"#;
        let receipts = decode_receipts(body).unwrap();

        assert_eq!(receipts.len(), 2);
        assert!(receipts["a"].is_ok());
        assert_eq!(receipts["a"].id, "a");
        assert_eq!(
            receipts["b"].error_code(),
            Some(&PushErrorCode::MessageRateExceeded)
        );
    }

    #[test]
    fn test_decode_receipts_with_fractional_sent_at_keeps_batch() {
        let body = r#"{"data":{
            "a":{"status":"ok"},
            "b":{"status":"error","message":"nope","details":{"error":"MessageTooBig","sentAt":1586353449.5}}
        }}"#;
        let receipts = decode_receipts(body).unwrap();

        assert_eq!(receipts.len(), 2);
        assert!(receipts["a"].is_ok());
        let sent_at = receipts["b"].details().and_then(|d| d.sent_at).unwrap();
        assert_eq!(sent_at.timestamp(), 1586353449);
    }

    #[test]
    fn test_decode_receipts_array_is_protocol_error() {
        let err = decode_receipts(r#"{"data":[]}"#).unwrap_err();
        assert!(matches!(err, PushError::Protocol { .. }));
    }
}
