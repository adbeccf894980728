use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::PushErrorCode;
use crate::error::PushError;

/// Final delivery outcome for one ticket, as reported by the receipts endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReceiptStatus {
    Ok,
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<ReceiptDetails>,
    },
}

/// Structured details attached to an error receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PushErrorCode>,
    /// Apple push service response, when the failure came from APNs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apns: Option<ApnsDetails>,
    /// Firebase response, when the failure came from FCM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcm: Option<FcmDetails>,
    /// When the service handed the message to the provider.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "chrono::serde::ts_seconds_option::serialize",
        deserialize_with = "deserialize_sent_at"
    )]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Epoch seconds, whole or fractional. Values that are not numbers or fall
/// outside the representable range read as absent.
fn deserialize_sent_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|secs| secs.is_finite())
        .and_then(|secs| DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApnsDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FcmDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A receipt together with the id it was requested under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushReceipt {
    pub id: String,
    #[serde(flatten)]
    pub status: ReceiptStatus,
}

impl PushReceipt {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, ReceiptStatus::Ok)
    }

    pub fn message(&self) -> Option<&str> {
        match &self.status {
            ReceiptStatus::Ok => None,
            ReceiptStatus::Error { message, .. } => Some(message),
        }
    }

    pub fn details(&self) -> Option<&ReceiptDetails> {
        match &self.status {
            ReceiptStatus::Ok => None,
            ReceiptStatus::Error { details, .. } => details.as_ref(),
        }
    }

    pub fn error_code(&self) -> Option<&PushErrorCode> {
        self.details().and_then(|d| d.error.as_ref())
    }
}

/// A receipt-id batch whose request failed as a whole.
#[derive(Debug)]
pub struct BatchFailure {
    pub ids: Vec<String>,
    pub error: PushError,
}

/// Merged outcome of a receipt lookup across all id batches.
///
/// Ids the service has no receipt for (not yet available, expired or
/// unknown) are simply absent from `receipts`.
#[derive(Debug, Default)]
pub struct ReceiptResults {
    pub receipts: HashMap<String, PushReceipt>,
    pub failures: Vec<BatchFailure>,
}

impl ReceiptResults {
    pub fn get(&self, id: &str) -> Option<&PushReceipt> {
        self.receipts.get(id)
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    /// True when every id batch was answered.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Requested ids that have no receipt and were not part of a failed batch.
    pub fn missing<'a, S: AsRef<str>>(&self, requested: &'a [S]) -> Vec<&'a str> {
        requested
            .iter()
            .map(|id| -> &'a str { id.as_ref() })
            .filter(|id| !self.receipts.contains_key(*id))
            .filter(|id| {
                !self
                    .failures
                    .iter()
                    .any(|f| f.ids.iter().any(|x| x.as_str() == *id))
            })
            .collect()
    }
}
