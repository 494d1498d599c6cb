//! Runtime-mutable configuration for the adaptive routing engine.
//!
//! Configuration is loaded from an optional TOML file, then overridden
//! by `ADAROUTER_*` environment variables, then validated. See
//! [`load_config`].

pub mod config;
pub mod env;
pub mod schema;

pub use config::{load_config, load_from_file, validate_config};
pub use env::apply_env_overrides;
pub use schema::{ConfigError, QueryClassProvider, RoutingConfig};
