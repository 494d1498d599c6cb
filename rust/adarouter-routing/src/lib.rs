//! # Adaptive Routing Engine
//!
//! A learning, measurement-driven query dispatcher. For every incoming
//! logical query it decides which set of storage adapters should
//! execute it, based on a continuously updated table of observed
//! execution times per query class.
//!
//! ## Architecture
//!
//! ```text
//! plan ──classify──▶ QC ──discover_placements──▶ candidate PSs
//!                                                     │
//!                                    initializeRow / lookup
//!                                                     ▼
//!                                            routing table row
//!                                                     │
//!                                                select (fast path)
//!                                                     ▼
//!                                              chosen PS ──▶ execution
//!                                                     │
//!                                       execution-time feedback
//!                                                     ▼
//!                                   table refresher (5s cadence)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use adarouter_routing::{AdaptiveRouter, catalog::InMemoryCatalog, monitoring::InMemoryMonitoringService};
//! use adarouter_config::RoutingConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = Arc::new(InMemoryCatalog::new());
//!     let monitoring = InMemoryMonitoringService::shared(25);
//!     let router = AdaptiveRouter::new(RoutingConfig::default(), catalog, monitoring);
//!
//!     router.start().await;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod catalog;
pub mod controller;
pub mod ddl;
pub mod error;
pub mod hasher;
pub mod intake;
pub mod introspection;
pub mod monitoring;
pub mod placement;
pub mod refresher;
pub mod selection;
pub mod table;
pub mod types;

pub use controller::AdaptiveRouter;
pub use error::{Result, RoutingError};
pub use hasher::{classify, LogicalOperator, LogicalPlan, StatementKind};
pub use types::{
    AdapterId, ColumnId, DataPoint, PlacementSet, QueryClass, RoutingEvent, RoutingRow,
    TimingSample, Weight,
};

/// Crate version, aligned with the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
