use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::ClientConfig, ConfigError};

/// Prefix for environment overrides, e.g. `EXPO_PUSH_ACCESS_TOKEN` or
/// `EXPO_PUSH_MAX_CONCURRENT_REQUESTS`. Keys are flat; no nesting separator.
const ENV_PREFIX: &str = "EXPO_PUSH_";

fn extract(figment: Figment) -> Result<ClientConfig, ConfigError> {
    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load client settings from a TOML file.
///
/// The file may set any subset of the keys; the rest keep their defaults.
/// `EXPO_PUSH_*` variables win over the file, so an access token can stay
/// out of the file entirely.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(
        Figment::from(Serialized::defaults(ClientConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX)),
    )
}

/// Client settings when no config file is present: defaults plus `EXPO_PUSH_*`.
pub fn load_config_from_env() -> Result<ClientConfig, ConfigError> {
    extract(
        Figment::from(Serialized::defaults(ClientConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX)),
    )
}

/// Parse client settings from inline TOML, without consulting the environment.
pub fn load_config_from_str(toml_str: &str) -> Result<ClientConfig, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
