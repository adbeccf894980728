//! Prometheus registry for the command-line client.
//!
//! The core crate only defines its collectors; they are registered here and
//! dumped to the log once a command finishes.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

fn register_metrics(registry: &Registry) {
    for metric in expo_push_core::metrics::all_metrics() {
        if let Err(e) = registry.register(metric) {
            tracing::warn!("Failed to register metric: {}", e);
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}
