//! Prometheus metrics for the push client.
//!
//! This module provides metrics for:
//! - Batches dispatched and failed, per endpoint
//! - Ticket and receipt outcomes
//!
//! Collectors are not registered anywhere by this crate; embedders add
//! [`all_metrics`] to their own registry.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

/// Batches dispatched by endpoint.
pub static BATCHES_DISPATCHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("expo_push_batches_total", "Total batches dispatched"),
        &["endpoint"], // "send", "receipts"
    )
    .unwrap()
});

/// Failed batches by endpoint and failure kind.
pub static BATCH_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("expo_push_batch_failures_total", "Total failed batches"),
        &["endpoint", "kind"], // kind: PushError::kind()
    )
    .unwrap()
});

/// Batch round-trip duration in seconds.
pub static BATCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "expo_push_batch_duration_seconds",
            "Duration of one push service request",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

/// Tickets received by status.
pub static TICKETS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("expo_push_tickets_total", "Total tickets received"),
        &["status"], // "ok", "error"
    )
    .unwrap()
});

/// Receipts received by status.
pub static RECEIPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("expo_push_receipts_total", "Total receipts received"),
        &["status"], // "ok", "error"
    )
    .unwrap()
});

/// Get all client metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(BATCHES_DISPATCHED.clone()),
        Box::new(BATCH_FAILURES.clone()),
        Box::new(BATCH_DURATION.clone()),
        Box::new(TICKETS.clone()),
        Box::new(RECEIPTS.clone()),
    ]
}
