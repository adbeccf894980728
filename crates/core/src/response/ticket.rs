use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PushErrorCode;

/// Outcome of one (message, recipient) pair as reported by the send endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TicketStatus {
    /// Accepted; `id` can later be redeemed for a receipt.
    Ok { id: String },
    /// Rejected for this recipient only. The rest of the batch is unaffected.
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<TicketDetails>,
    },
}

/// Structured details attached to an error ticket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PushErrorCode>,
    /// Token the error refers to, sent with `DeviceNotRegistered`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expo_push_token: Option<String>,
    /// Any other fields the service includes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A ticket tagged with the message and recipient it was issued for.
///
/// The service answers with a flat list; the client restores which input
/// message and which recipient each entry belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushTicket {
    /// Position of the originating message in the caller's input.
    pub message_index: usize,
    pub recipient: String,
    #[serde(flatten)]
    pub status: TicketStatus,
}

impl PushTicket {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, TicketStatus::Ok { .. })
    }

    /// Receipt id to redeem later, for accepted tickets.
    pub fn receipt_id(&self) -> Option<&str> {
        match &self.status {
            TicketStatus::Ok { id } => Some(id),
            TicketStatus::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            TicketStatus::Ok { .. } => None,
            TicketStatus::Error { message, .. } => Some(message),
        }
    }

    pub fn error_code(&self) -> Option<&PushErrorCode> {
        match &self.status {
            TicketStatus::Error {
                details: Some(details),
                ..
            } => details.error.as_ref(),
            _ => None,
        }
    }

    pub fn is_device_not_registered(&self) -> bool {
        self.error_code() == Some(&PushErrorCode::DeviceNotRegistered)
    }

    /// Token that failed, preferring the one named by the service.
    pub fn failed_token(&self) -> Option<&str> {
        match &self.status {
            TicketStatus::Ok { .. } => None,
            TicketStatus::Error { details, .. } => Some(
                details
                    .as_ref()
                    .and_then(|d| d.expo_push_token.as_deref())
                    .unwrap_or(self.recipient.as_str()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ok_ticket() {
        let status: TicketStatus =
            serde_json::from_str(r#"{"status":"ok","id":"XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX"}"#)
                .unwrap();
        assert_eq!(
            status,
            TicketStatus::Ok {
                id: "XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX".to_string()
            }
        );
    }

    #[test]
    fn test_decode_device_not_registered_ticket() {
        let status: TicketStatus = serde_json::from_str(
            r#"{
                "status": "error",
                "message": "\"ExponentPushToken[xxx]\" is not a registered push notification recipient",
                "details": {
                    "error": "DeviceNotRegistered",
                    "expoPushToken": "ExponentPushToken[xxx]"
                }
            }"#,
        )
        .unwrap();

        let ticket = PushTicket {
            message_index: 3,
            recipient: "ExponentPushToken[xxx]".to_string(),
            status,
        };
        assert!(!ticket.is_ok());
        assert!(ticket.is_device_not_registered());
        assert_eq!(ticket.failed_token(), Some("ExponentPushToken[xxx]"));
        assert!(ticket.receipt_id().is_none());
    }

    #[test]
    fn test_failed_token_falls_back_to_recipient() {
        let ticket = PushTicket {
            message_index: 0,
            recipient: "ExponentPushToken[yyy]".to_string(),
            status: TicketStatus::Error {
                message: "too big".to_string(),
                details: Some(TicketDetails {
                    error: Some(PushErrorCode::MessageTooBig),
                    ..Default::default()
                }),
            },
        };
        assert_eq!(ticket.failed_token(), Some("ExponentPushToken[yyy]"));
        assert_eq!(ticket.error_code(), Some(&PushErrorCode::MessageTooBig));
        assert_eq!(ticket.error_message(), Some("too big"));
    }

    #[test]
    fn test_ticket_serializes_flat() {
        let ticket = PushTicket {
            message_index: 1,
            recipient: "t".to_string(),
            status: TicketStatus::Ok {
                id: "r1".to_string(),
            },
        };
        let value = serde_json::to_value(&ticket).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"message_index": 1, "recipient": "t", "status": "ok", "id": "r1"})
        );
    }
}
