//! Push client: batches submissions and dispatches one request per batch.

mod decode;
mod pending;

pub use pending::{abort_batches, join_batches, PendingBatch};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::chunk::{chunk_message_indices, chunk_push_messages, chunk_receipt_ids};
use crate::config::ClientConfig;
use crate::error::PushError;
use crate::message::PushItem;
use crate::metrics::{BATCHES_DISPATCHED, BATCH_DURATION, BATCH_FAILURES, RECEIPTS, TICKETS};
use crate::response::{BatchFailure, PushReceipt, PushTicket, ReceiptResults};
use crate::transport::{ReqwestTransport, Transport};

use decode::{decode_receipts, decode_tickets};

const SEND_ENDPOINT: &str = "send";
const RECEIPTS_ENDPOINT: &str = "receipts";

/// A serialized send request plus the recipients it will produce tickets for.
struct SendRequest {
    body: String,
    recipients: Vec<(usize, String)>,
}

impl SendRequest {
    /// Serialize the messages at `indices`, flattening their recipients.
    fn build<M>(messages: &[M], indices: &[usize]) -> Result<Self, PushError>
    where
        M: PushItem + Serialize,
    {
        let batch: Vec<&M> = indices.iter().map(|&i| &messages[i]).collect();
        let body =
            serde_json::to_string(&batch).map_err(|e| PushError::Serialize(e.to_string()))?;

        let recipients = indices
            .iter()
            .flat_map(|&i| {
                messages[i]
                    .recipients()
                    .iter()
                    .map(move |recipient| (i, recipient.clone()))
            })
            .collect();

        Ok(Self { body, recipients })
    }
}

#[derive(Serialize)]
struct ReceiptRequest<'a> {
    ids: &'a [String],
}

/// Client for the push service.
///
/// Holds one transport (and its connection pool) for its whole lifetime.
/// Batches are spawned on the ambient Tokio runtime, so the dispatching
/// methods must be called from within one.
pub struct PushClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    push_chunk_limit: usize,
    receipt_chunk_limit: usize,
    limiter: Option<Arc<Semaphore>>,
}

impl PushClient {
    /// Create a client backed by the HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self, PushError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: config.base_url,
            push_chunk_limit: config.push_chunk_limit.max(1),
            receipt_chunk_limit: config.receipt_chunk_limit.max(1),
            limiter: config
                .max_concurrent_requests
                .map(|permits| Arc::new(Semaphore::new(permits.max(1)))),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/push/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Group messages into request-sized batches using the configured limit.
    pub fn chunk_push_notifications<'a, M: PushItem>(
        &self,
        messages: &'a [M],
    ) -> Vec<Vec<&'a M>> {
        chunk_push_messages(messages, self.push_chunk_limit)
    }

    /// Split receipt ids into request-sized batches using the configured limit.
    pub fn chunk_push_notification_receipt_ids<'a, S: AsRef<str>>(
        &self,
        ids: &'a [S],
    ) -> Vec<Vec<&'a str>> {
        chunk_receipt_ids(ids, self.receipt_chunk_limit)
    }

    /// Send messages, one concurrent request per batch.
    ///
    /// Returns one handle per batch. Each resolves to that batch's tickets in
    /// submission order, tagged with the originating message index and
    /// recipient. Messages without recipients are skipped.
    pub fn send_push_notifications<M>(
        &self,
        messages: &[M],
    ) -> Vec<PendingBatch<Vec<PushTicket>>>
    where
        M: PushItem + Serialize,
    {
        let chunks = chunk_message_indices(messages, self.push_chunk_limit);
        info!(
            messages = messages.len(),
            batches = chunks.len(),
            "Dispatching push notifications"
        );

        chunks
            .iter()
            .enumerate()
            .map(|(batch, indices)| match SendRequest::build(messages, indices) {
                Ok(request) => self.spawn_send(batch, request),
                Err(e) => {
                    warn!(batch, error = %e, "Failed to encode push batch");
                    BATCH_FAILURES
                        .with_label_values(&[SEND_ENDPOINT, e.kind()])
                        .inc();
                    let recipients = indices
                        .iter()
                        .map(|&i| messages[i].recipient_count())
                        .sum();
                    PendingBatch::failed(e, recipients)
                }
            })
            .collect()
    }

    /// Send all `messages` as a single request, without chunking.
    ///
    /// Intended for callers that chunk themselves; the service rejects
    /// requests over its limit.
    pub async fn send_push_notification_batch<M>(
        &self,
        messages: &[M],
    ) -> Result<Vec<PushTicket>, PushError>
    where
        M: PushItem + Serialize,
    {
        let indices: Vec<usize> = (0..messages.len())
            .filter(|&i| messages[i].recipient_count() > 0)
            .collect();
        if indices.is_empty() {
            debug!("No recipients in push batch, skipping request");
            return Ok(Vec::new());
        }
        let request = SendRequest::build(messages, &indices)?;

        let _permit = acquire(self.limiter.clone()).await?;
        send_batch(self.transport.as_ref(), &self.endpoint("send"), request).await
    }

    fn spawn_send(&self, batch: usize, request: SendRequest) -> PendingBatch<Vec<PushTicket>> {
        let transport = Arc::clone(&self.transport);
        let url = self.endpoint("send");
        let limiter = self.limiter.clone();
        let recipients = request.recipients.len();

        let handle = tokio::spawn(async move {
            let _permit = acquire(limiter).await?;
            debug!(batch, recipients, "Sending push batch");

            let result = send_batch(transport.as_ref(), &url, request).await;
            if let Err(e) = &result {
                warn!(batch, recipients, error = %e, "Push batch failed");
            }
            result
        });

        PendingBatch::spawned(handle, recipients)
    }

    /// Fetch receipts for `ids`, one concurrent request per id batch.
    ///
    /// Batches that fail are reported in [`ReceiptResults::failures`]; the
    /// receipts of the other batches are still returned.
    pub async fn get_push_notification_receipts<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> ReceiptResults {
        let chunks = self.chunk_push_notification_receipt_ids(ids);
        info!(
            ids = ids.len(),
            batches = chunks.len(),
            "Fetching push receipts"
        );

        let (id_batches, pending): (Vec<Vec<String>>, Vec<_>) = chunks
            .into_iter()
            .enumerate()
            .map(|(batch, chunk)| {
                let owned: Vec<String> = chunk.into_iter().map(str::to_string).collect();
                let pending = self.spawn_receipts(batch, owned.clone());
                (owned, pending)
            })
            .unzip();

        let mut results = ReceiptResults::default();
        for (ids, outcome) in id_batches.into_iter().zip(join_batches(pending).await) {
            match outcome {
                Ok(receipts) => results.receipts.extend(receipts),
                Err(error) => results.failures.push(BatchFailure { ids, error }),
            }
        }

        results
    }

    /// Fetch receipts for `ids` in a single request, without chunking.
    pub async fn get_push_notification_receipt_batch<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<HashMap<String, PushReceipt>, PushError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<String> = ids.iter().map(|id| id.as_ref().to_string()).collect();

        let _permit = acquire(self.limiter.clone()).await?;
        fetch_receipts(self.transport.as_ref(), &self.endpoint("getReceipts"), &ids).await
    }

    fn spawn_receipts(
        &self,
        batch: usize,
        ids: Vec<String>,
    ) -> PendingBatch<HashMap<String, PushReceipt>> {
        let transport = Arc::clone(&self.transport);
        let url = self.endpoint("getReceipts");
        let limiter = self.limiter.clone();
        let count = ids.len();

        let handle = tokio::spawn(async move {
            let _permit = acquire(limiter).await?;
            debug!(batch, ids = count, "Fetching receipt batch");

            let result = fetch_receipts(transport.as_ref(), &url, &ids).await;
            if let Err(e) = &result {
                warn!(batch, ids = count, error = %e, "Receipt batch failed");
            }
            result
        });

        PendingBatch::spawned(handle, count)
    }
}

async fn acquire(
    limiter: Option<Arc<Semaphore>>,
) -> Result<Option<OwnedSemaphorePermit>, PushError> {
    match limiter {
        Some(semaphore) => semaphore
            .acquire_owned()
            .await
            .map(Some)
            .map_err(|e| PushError::Task(e.to_string())),
        None => Ok(None),
    }
}

async fn send_batch(
    transport: &dyn Transport,
    url: &str,
    request: SendRequest,
) -> Result<Vec<PushTicket>, PushError> {
    BATCHES_DISPATCHED.with_label_values(&[SEND_ENDPOINT]).inc();
    let started = Instant::now();

    let result = match transport.post(url, request.body).await {
        Ok(body) => decode_tickets(&body, &request.recipients),
        Err(e) => Err(e.into()),
    };

    BATCH_DURATION
        .with_label_values(&[SEND_ENDPOINT])
        .observe(started.elapsed().as_secs_f64());

    match &result {
        Ok(tickets) => {
            let failed = tickets.iter().filter(|t| !t.is_ok()).count();
            TICKETS
                .with_label_values(&["ok"])
                .inc_by((tickets.len() - failed) as u64);
            TICKETS.with_label_values(&["error"]).inc_by(failed as u64);
            if failed > 0 {
                debug!(tickets = tickets.len(), failed, "Push batch has error tickets");
            }
        }
        Err(e) => BATCH_FAILURES
            .with_label_values(&[SEND_ENDPOINT, e.kind()])
            .inc(),
    }

    result
}

async fn fetch_receipts(
    transport: &dyn Transport,
    url: &str,
    ids: &[String],
) -> Result<HashMap<String, PushReceipt>, PushError> {
    BATCHES_DISPATCHED
        .with_label_values(&[RECEIPTS_ENDPOINT])
        .inc();
    let started = Instant::now();

    let body = serde_json::to_string(&ReceiptRequest { ids })
        .map_err(|e| PushError::Serialize(e.to_string()))?;
    let result = match transport.post(url, body).await {
        Ok(body) => decode_receipts(&body),
        Err(e) => Err(e.into()),
    };

    BATCH_DURATION
        .with_label_values(&[RECEIPTS_ENDPOINT])
        .observe(started.elapsed().as_secs_f64());

    match &result {
        Ok(receipts) => {
            for receipt in receipts.values() {
                let status = if receipt.is_ok() { "ok" } else { "error" };
                RECEIPTS.with_label_values(&[status]).inc();
            }
        }
        Err(e) => BATCH_FAILURES
            .with_label_values(&[RECEIPTS_ENDPOINT, e.kind()])
            .inc(),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::PushMessage;
    use crate::testing::MockTransport;

    fn client(transport: Arc<MockTransport>) -> PushClient {
        PushClient::with_transport(ClientConfig::default(), transport)
    }

    #[test]
    fn test_base_url_is_overridable() {
        let mut client = client(Arc::new(MockTransport::new()));
        assert_eq!(client.base_url(), "https://exp.host/--/api/v2");

        client.set_base_url("http://example.com/");
        assert_eq!(client.base_url(), "http://example.com/");
        assert_eq!(client.endpoint("send"), "http://example.com/push/send");
    }

    #[test]
    fn test_send_request_flattens_recipients() {
        let messages = vec![
            PushMessage::new("a"),
            PushMessage::default(),
            PushMessage::to_many(["b", "c"]),
        ];
        let request = SendRequest::build(&messages, &[0, 2]).unwrap();

        assert_eq!(
            request.recipients,
            vec![
                (0, "a".to_string()),
                (2, "b".to_string()),
                (2, "c".to_string())
            ]
        );
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body, serde_json::json!([{"to": "a"}, {"to": ["b", "c"]}]));
    }

    #[tokio::test]
    async fn test_send_posts_to_send_endpoint() {
        let transport = Arc::new(MockTransport::new());
        let client = client(Arc::clone(&transport));

        let batches = client.send_push_notifications(&[PushMessage::new("ExponentPushToken[a]")]);
        assert_eq!(batches.len(), 1);
        let tickets = join_batches(batches).await.remove(0).unwrap();
        assert_eq!(tickets.len(), 1);

        let requests = transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://exp.host/--/api/v2/push/send");
    }

    #[tokio::test]
    async fn test_receipt_batch_posts_ids() {
        let transport = Arc::new(MockTransport::new());
        let client = client(Arc::clone(&transport));

        let receipts = client
            .get_push_notification_receipt_batch(&["r-1", "r-2"])
            .await
            .unwrap();
        assert!(receipts.is_empty());

        let requests = transport.requests().await;
        assert_eq!(requests[0].url, "https://exp.host/--/api/v2/push/getReceipts");
        assert_eq!(requests[0].body, r#"{"ids":["r-1","r-2"]}"#);
    }
}
