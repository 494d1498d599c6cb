//! Configuration loading: file, then environment, then validation.

use crate::env::apply_env_overrides;
use crate::schema::{ConfigError, RoutingConfig};
use std::path::Path;

/// Load routing configuration.
///
/// Hierarchy: defaults → optional TOML file → `ADAROUTER_*` environment
/// overrides → validation. `path` is optional; a missing or absent
/// file simply means "start from defaults".
pub fn load_config(path: Option<&Path>) -> Result<RoutingConfig, ConfigError> {
    let mut config = match path {
        Some(path) if path.exists() => load_from_file(path)?,
        _ => RoutingConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file, without env overrides or
/// validation.
pub fn load_from_file(path: &Path) -> Result<RoutingConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    Ok(toml::from_str(&content)?)
}

/// Validate a loaded configuration.
pub fn validate_config(config: &RoutingConfig) -> Result<(), ConfigError> {
    if config.window_size == 0 {
        return Err(ConfigError::Validation(
            "windowSize must be at least 1".to_string(),
        ));
    }

    if config.short_running_long_running_threshold_ms == 0 {
        return Err(ConfigError::Validation(
            "shortRunningLongRunningThreshold must be positive".to_string(),
        ));
    }

    if config.refresh_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "refreshIntervalMs must be positive".to_string(),
        ));
    }

    Ok(())
}
