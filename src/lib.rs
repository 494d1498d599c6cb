//! Adaptive, measurement-driven query routing engine.
//!
//! Thin facade over [`adarouter_routing`]: re-exports the public API so
//! downstream crates depend on a single package name, and carries the
//! demo binary (`adarouter-introspect`) that wires the router to its
//! in-memory collaborator implementations end-to-end.

pub use adarouter_config::{ConfigError, QueryClassProvider, RoutingConfig};
pub use adarouter_routing::{
    catalog, controller, ddl, hasher, intake, introspection, monitoring, placement, refresher,
    selection, table, types, AdaptiveRouter, LogicalOperator, LogicalPlan, PlacementSet,
    QueryClass, Result, RoutingError, StatementKind,
};
