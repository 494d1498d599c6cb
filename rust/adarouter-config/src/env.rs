//! `ADAROUTER_*` environment variable overrides.

use crate::schema::{ConfigError, QueryClassProvider, RoutingConfig};

/// Apply `ADAROUTER_*` environment overrides onto a loaded config.
/// Values present in the environment win over whatever the file (or
/// defaults) set.
pub fn apply_env_overrides(config: &mut RoutingConfig) -> Result<(), ConfigError> {
    if let Ok(value) = std::env::var("ADAROUTER_TRAINING") {
        config.training = parse_bool(&value, "ADAROUTER_TRAINING")?;
    }

    if let Ok(value) = std::env::var("ADAROUTER_WINDOW_SIZE") {
        config.window_size = parse_u32(&value, "ADAROUTER_WINDOW_SIZE")?;
    }

    if let Ok(value) = std::env::var("ADAROUTER_SHORT_RUNNING_SIMILAR_THRESHOLD") {
        config.short_running_similar_threshold =
            parse_u32(&value, "ADAROUTER_SHORT_RUNNING_SIMILAR_THRESHOLD")?;
    }

    if let Ok(value) = std::env::var("ADAROUTER_LONG_RUNNING_SIMILAR_THRESHOLD") {
        config.long_running_similar_threshold =
            parse_u32(&value, "ADAROUTER_LONG_RUNNING_SIMILAR_THRESHOLD")?;
    }

    if let Ok(value) = std::env::var("ADAROUTER_SHORT_RUNNING_LONG_RUNNING_THRESHOLD_MS") {
        config.short_running_long_running_threshold_ms =
            parse_u64(&value, "ADAROUTER_SHORT_RUNNING_LONG_RUNNING_THRESHOLD_MS")?;
    }

    if let Ok(value) = std::env::var("ADAROUTER_REFRESH_INTERVAL_MS") {
        config.refresh_interval_ms = parse_u64(&value, "ADAROUTER_REFRESH_INTERVAL_MS")?;
    }

    if let Ok(value) = std::env::var("ADAROUTER_QUERY_CLASS_PROVIDER") {
        config.query_class_provider = match value.to_uppercase().as_str() {
            "STRUCTURAL_SHUTTLE" => QueryClassProvider::StructuralShuttle,
            "PARAMETERIZER" => QueryClassProvider::Parameterizer,
            _ => {
                return Err(ConfigError::InvalidEnvValue {
                    key: "ADAROUTER_QUERY_CLASS_PROVIDER".to_string(),
                    value,
                })
            }
        };
    }

    Ok(())
}

fn parse_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidEnvValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_u32(value: &str, key: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(value: &str, key: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global; serialize access so
    // these tests don't race with each other under `cargo test`.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn overrides_training_flag() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("ADAROUTER_TRAINING", "false");
        let mut config = RoutingConfig::default();
        apply_env_overrides(&mut config).unwrap();
        assert!(!config.training);
        std::env::remove_var("ADAROUTER_TRAINING");
    }

    #[test]
    fn rejects_invalid_provider() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("ADAROUTER_QUERY_CLASS_PROVIDER", "NOT_A_PROVIDER");
        let mut config = RoutingConfig::default();
        let err = apply_env_overrides(&mut config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvValue { .. }));
        std::env::remove_var("ADAROUTER_QUERY_CLASS_PROVIDER");
    }
}
