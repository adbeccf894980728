use super::{types::ClientConfig, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Base URL is http(s)
/// - Chunk limits and timeout are not 0
/// - Concurrency cap, when set, is not 0
pub fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "base_url must be an http(s) URL, got '{}'",
            config.base_url
        )));
    }

    if config.push_chunk_limit == 0 {
        return Err(ConfigError::ValidationError(
            "push_chunk_limit cannot be 0".to_string(),
        ));
    }

    if config.receipt_chunk_limit == 0 {
        return Err(ConfigError::ValidationError(
            "receipt_chunk_limit cannot be 0".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.max_concurrent_requests == Some(0) {
        return Err(ConfigError::ValidationError(
            "max_concurrent_requests cannot be 0".to_string(),
        ));
    }

    Ok(())
}
