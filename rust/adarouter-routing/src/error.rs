//! Error types for the routing engine.

use crate::types::QueryClass;
use thiserror::Error;

/// Result type for routing operations.
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors that can occur while routing a query.
///
/// Per spec.md §7, routing failures never silently alter correctness:
/// they either pick a valid placement or refuse to route.
#[derive(Error, Debug)]
pub enum RoutingError {
    /// Placement discovery found no candidate placement sets for a
    /// table. Fatal for the query being planned; never crashes the
    /// router itself.
    #[error("no candidate placements found for table {table}")]
    NoCandidatePlacements {
        /// Table that has no coverable placement.
        table: String,
    },

    /// The selection loop exhausted the row without picking a
    /// placement set. Indicates a malformed row (weights that don't
    /// sum correctly) rather than caller error.
    #[error("selection exhausted row for query class {0:?} without choosing a placement")]
    SelectionExhausted(QueryClass),

    /// The external monitoring service could not be reached during
    /// refresh. Not fatal: the class's mean-time map is treated as
    /// empty for this cycle.
    #[error("monitoring service unavailable: {0}")]
    MonitoringUnavailable(String),

    /// `MERGE` is not supported on the modification path.
    #[error("MERGE is not supported by the adaptive routing engine")]
    UnsupportedOperation,

    /// Configuration failed to load or validate.
    #[error("configuration error: {0}")]
    Config(#[from] adarouter_config::ConfigError),

    /// Catch-all for collaborator/demo-level failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
