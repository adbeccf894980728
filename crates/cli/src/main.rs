mod metrics;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expo_push_core::{
    is_expo_push_token, join_batches, load_config, load_config_from_env, validate_config,
    ClientConfig, PushClient, PushItem, PushMessage, SanitizedConfig,
};

const USAGE: &str = "usage: expo-push send <messages.json> | expo-push receipts <id>...";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        bail!(USAGE);
    };

    let config = load_client_config()?;
    validate_config(&config).context("Configuration validation failed")?;
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    let client = PushClient::new(config).context("Failed to create push client")?;

    let result = match command.as_str() {
        "send" => {
            let [path] = rest else {
                bail!(USAGE);
            };
            send(&client, PathBuf::from(path)).await
        }
        "receipts" if !rest.is_empty() => receipts(&client, rest).await,
        _ => bail!(USAGE),
    };

    match metrics::encode_metrics() {
        Ok(output) => debug!("Metrics:\n{}", output),
        Err(e) => warn!("{:#}", e),
    }

    result
}

/// Config file from `EXPO_PUSH_CONFIG` (default `expo-push.toml`), falling
/// back to defaults plus environment when no file exists.
fn load_client_config() -> Result<ClientConfig> {
    let config_path = std::env::var("EXPO_PUSH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("expo-push.toml"));

    if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))
    } else {
        info!("No config file at {:?}, using environment", config_path);
        load_config_from_env().context("Failed to load config from environment")
    }
}

async fn send(client: &PushClient, path: PathBuf) -> Result<()> {
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read messages from {:?}", path))?;
    let messages: Vec<PushMessage> =
        serde_json::from_str(&raw).context("Messages file must be a JSON array of messages")?;

    for (index, message) in messages.iter().enumerate() {
        for token in message.recipients() {
            if !is_expo_push_token(token) {
                warn!(index, token = %token, "Recipient is not a valid push token");
            }
        }
    }

    let results = join_batches(client.send_push_notifications(&messages)).await;

    let mut failed_batches = 0;
    for (batch, result) in results.into_iter().enumerate() {
        match result {
            Ok(tickets) => {
                for ticket in tickets {
                    println!("{}", serde_json::to_string(&ticket)?);
                }
            }
            Err(e) => {
                failed_batches += 1;
                error!(batch, "Batch failed: {}", e);
            }
        }
    }

    if failed_batches > 0 {
        bail!("{} batch(es) failed", failed_batches);
    }
    Ok(())
}

async fn receipts(client: &PushClient, ids: &[String]) -> Result<()> {
    let results = client.get_push_notification_receipts(ids).await;

    for id in ids {
        if let Some(receipt) = results.get(id) {
            println!("{}", serde_json::to_string(receipt)?);
        }
    }
    for id in results.missing(ids) {
        warn!(id, "No receipt available");
    }
    for failure in &results.failures {
        error!(ids = failure.ids.len(), "Receipt batch failed: {}", failure.error);
    }

    if !results.is_complete() {
        bail!("{} receipt batch(es) failed", results.failures.len());
    }
    Ok(())
}
