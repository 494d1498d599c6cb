//! Configuration schema for the adaptive routing engine.
//!
//! Mirrors spec.md §6: seven runtime-mutable values, all with defaults
//! that keep a fresh router usable without any configuration at all.

use serde::{Deserialize, Serialize};

/// Strategy the query class hasher uses to reduce a logical plan to a
/// stable fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryClassProvider {
    /// Walk the operator tree, collecting structural discriminators.
    StructuralShuttle,
    /// Extract literals into parameters, then hash the canonical form.
    Parameterizer,
}

impl Default for QueryClassProvider {
    fn default() -> Self {
        Self::Parameterizer
    }
}

/// Runtime-mutable configuration for the routing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// When `false`, feedback events are not emitted and the table
    /// freezes in its current state.
    #[serde(default = "default_training")]
    pub training: bool,

    /// Advisory moving-average window retained by the monitoring
    /// service for per-class time samples.
    #[serde(default = "default_window_size")]
    pub window_size: u32,

    /// Similarity band, in percent, for short-running queries. Zero
    /// disables weighted choice (deterministic fastest-wins).
    #[serde(default)]
    pub short_running_similar_threshold: u32,

    /// Similarity band, in percent, for long-running queries.
    #[serde(default)]
    pub long_running_similar_threshold: u32,

    /// Boundary, in milliseconds, between the short- and long-running
    /// regimes.
    #[serde(default = "default_short_long_threshold_ms")]
    pub short_running_long_running_threshold_ms: u64,

    /// Which hashing strategy `classify` uses.
    #[serde(default)]
    pub query_class_provider: QueryClassProvider,

    /// Cadence of the background table refresher, in milliseconds.
    /// Shared config rather than a constant so tests can shrink it.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

fn default_training() -> bool {
    true
}

fn default_window_size() -> u32 {
    25
}

fn default_short_long_threshold_ms() -> u64 {
    1000
}

fn default_refresh_interval_ms() -> u64 {
    5000
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            training: default_training(),
            window_size: default_window_size(),
            short_running_similar_threshold: 0,
            long_running_similar_threshold: 0,
            short_running_long_running_threshold_ms: default_short_long_threshold_ms(),
            query_class_provider: QueryClassProvider::default(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file's TOML could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A loaded value failed validation.
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// An environment variable override could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidEnvValue {
        /// Environment variable name.
        key: String,
        /// Raw value that failed to parse.
        value: String,
    },
}
