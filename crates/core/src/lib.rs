//! Client for the Expo push notification service.
//!
//! Messages are partitioned into request-sized batches (see [`chunk`]), each
//! batch is posted concurrently, and the flat ticket list of every response is
//! re-attached to the messages and recipients that produced it.

pub mod chunk;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod metrics;
pub mod response;
pub mod testing;
pub mod token;
pub mod transport;

pub use chunk::{chunk_message_indices, chunk_push_messages, chunk_receipt_ids};
pub use client::{abort_batches, join_batches, PendingBatch, PushClient};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, ClientConfig,
    ConfigError, SanitizedConfig, DEFAULT_BASE_URL, PUSH_NOTIFICATION_CHUNK_LIMIT,
    PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT,
};
pub use error::{ApiError, PushError};
pub use message::{PushItem, PushMessage, PushPriority, PushRecipients};
pub use response::{
    ApnsDetails, BatchFailure, FcmDetails, PushErrorCode, PushReceipt, PushTicket, ReceiptDetails,
    ReceiptResults, ReceiptStatus, TicketDetails, TicketStatus,
};
pub use token::is_expo_push_token;
pub use transport::{ReqwestTransport, Transport, TransportError};
