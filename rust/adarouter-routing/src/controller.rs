//! # Adaptive Router — facade orchestration
//!
//! Wires the query class hasher, placement discovery, routing table,
//! table refresher, selection policy, and intake into the single
//! entry point the rest of the system calls.
//!
//! Grounded on `knhk-autonomic::controller::AutonomicController`: same
//! `new`/`start`/`stop` shape, the same `AtomicBool` running flag, the
//! same `#[instrument]` usage on the public async entry points.
//!
//! ## Example
//!
//! ```rust,no_run
//! use adarouter_routing::{AdaptiveRouter, catalog::InMemoryCatalog, monitoring::InMemoryMonitoringService};
//! use adarouter_config::RoutingConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let catalog = Arc::new(InMemoryCatalog::new());
//! let monitoring = InMemoryMonitoringService::shared(25);
//! let router = AdaptiveRouter::new(RoutingConfig::default(), catalog, monitoring);
//!
//! router.start().await;
//! # Ok(())
//! # }
//! ```

use crate::catalog::Catalog;
use crate::error::{Result, RoutingError};
use crate::hasher::{classify, LogicalPlan, StatementKind};
use crate::intake::ExecutionTimeIntake;
use crate::introspection::IntrospectionView;
use crate::placement::discover_placements;
use crate::refresher::{RefresherConfig, TableRefresher};
use crate::selection::{select, RandomSource, ThreadRandomSource};
use crate::table::{RoutingTable, SharedRoutingTable};
use crate::types::{AdapterId, PlacementSet, QueryClass};
use adarouter_config::RoutingConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// Facade over the adaptive routing engine: the single entry point the
/// query planner calls to classify, route, and record feedback for a
/// query.
pub struct AdaptiveRouter {
    config: Arc<RwLock<RoutingConfig>>,
    table: SharedRoutingTable,
    catalog: Arc<dyn Catalog + Send + Sync>,
    intake: ExecutionTimeIntake,
    refresher: Arc<TableRefresher>,
    running: Arc<AtomicBool>,
}

impl AdaptiveRouter {
    /// Construct a router. Does not start the background refresher;
    /// call [`AdaptiveRouter::start`] for that.
    #[instrument(skip(config, catalog, monitoring))]
    pub fn new(
        config: RoutingConfig,
        catalog: Arc<dyn Catalog + Send + Sync>,
        monitoring: Arc<dyn crate::monitoring::MonitoringService>,
    ) -> Self {
        info!("initializing adaptive router");

        let table = Arc::new(RoutingTable::new());
        let refresher_config = RefresherConfig {
            similar_short: config.short_running_similar_threshold,
            similar_long: config.long_running_similar_threshold,
            short_long_threshold_nanos: config.short_running_long_running_threshold_ms
                * 1_000_000,
        };
        let refresher = Arc::new(TableRefresher::new(
            table.clone(),
            monitoring.clone(),
            refresher_config,
            Duration::from_millis(config.refresh_interval_ms),
        ));

        Self {
            config: Arc::new(RwLock::new(config)),
            table,
            catalog,
            intake: ExecutionTimeIntake::new(monitoring),
            refresher,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the background table refresher. Idempotent: calling twice
    /// has no additional effect.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        self.refresher.clone().spawn();
    }

    /// Stop the background refresher. The router remains usable for
    /// request-path calls; only the periodic rewrite halts.
    pub fn stop(&self) {
        self.refresher.stop();
        self.running.store(false, Ordering::SeqCst);
    }

    /// Classify, discover placements, and select an adapter set for a
    /// logical plan against `table`. This is the fast path: no
    /// suspension points beyond the table's read lock.
    ///
    /// Modification plans (`INSERT`/`UPDATE`/`DELETE`/`MERGE`) never
    /// reach the classifier or the routing table (spec.md §4.1, §4.5
    /// rule 4): they dispatch to every adapter hosting `table`. `MERGE`
    /// is rejected outright.
    #[instrument(skip(self, plan))]
    pub async fn route(&self, table: &str, plan: &LogicalPlan) -> Result<PlacementSet> {
        if let Some(stores) = self.modification_dispatch(table, plan)? {
            return Ok(stores);
        }

        let provider = self.config.read().await.query_class_provider;
        let query_class = classify(plan, provider);

        if !self.table.contains(&query_class).await {
            let candidates = discover_placements(self.catalog.as_ref(), table);
            if candidates.is_empty() {
                return Err(RoutingError::NoCandidatePlacements {
                    table: table.to_string(),
                });
            }
            self.register_labels(&candidates).await;
            self.table
                .initialize_row(query_class.clone(), &candidates)
                .await;
            return Ok(candidates[0].clone());
        }

        let row = self
            .table
            .get(&query_class)
            .await
            .expect("row exists: contains() returned true above");

        let similar_short = self.config.read().await.short_running_similar_threshold;
        let mut rng = ThreadRandomSource;
        select(&query_class, &row, similar_short, &mut rng)
    }

    /// Same as [`AdaptiveRouter::route`], but with a caller-supplied
    /// random source — for deterministic selection in tests.
    pub async fn route_with_random(
        &self,
        table: &str,
        plan: &LogicalPlan,
        random: &mut impl RandomSource,
    ) -> Result<PlacementSet> {
        if let Some(stores) = self.modification_dispatch(table, plan)? {
            return Ok(stores);
        }

        let provider = self.config.read().await.query_class_provider;
        let query_class = classify(plan, provider);

        if !self.table.contains(&query_class).await {
            let candidates = discover_placements(self.catalog.as_ref(), table);
            if candidates.is_empty() {
                return Err(RoutingError::NoCandidatePlacements {
                    table: table.to_string(),
                });
            }
            self.register_labels(&candidates).await;
            self.table
                .initialize_row(query_class.clone(), &candidates)
                .await;
            return Ok(candidates[0].clone());
        }

        let row = self
            .table
            .get(&query_class)
            .await
            .expect("row exists: contains() returned true above");

        let similar_short = self.config.read().await.short_running_similar_threshold;
        select(&query_class, &row, similar_short, random)
    }

    /// `None` for ordinary query plans (the caller should proceed to
    /// classify/select). `Some(stores)` for modification plans, which
    /// bypass classification and the routing table entirely and
    /// dispatch to every adapter hosting `table`. Errors if the plan is
    /// a `MERGE`, which this router does not support.
    fn modification_dispatch(&self, table: &str, plan: &LogicalPlan) -> Result<Option<PlacementSet>> {
        match plan.kind {
            StatementKind::Query => Ok(None),
            StatementKind::Merge => Err(RoutingError::UnsupportedOperation),
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete => {
                let stores = self.catalog.placements_by_adapter(table).into_keys();
                Ok(Some(PlacementSet::from_adapters(stores)))
            }
        }
    }

    /// Populate the known-adapters registry's human labels for every
    /// adapter referenced by `candidates`, from the catalog's own
    /// `adapter_unique_name` (spec.md §3, surfaced by the introspection
    /// view).
    async fn register_labels(&self, candidates: &[PlacementSet]) {
        for candidate in candidates {
            for adapter in candidate.adapters() {
                if let Some(name) = self.catalog.adapter_unique_name(adapter) {
                    self.table.register_adapter_label(adapter, name).await;
                }
            }
        }
    }

    /// Record an execution-time observation via the structured
    /// intake path. No-op when `training` is disabled, per spec.md §6.
    pub async fn record_execution_time(
        &self,
        placement_set: PlacementSet,
        query_class: QueryClass,
        nanos: u64,
    ) {
        if !self.config.read().await.training {
            return;
        }
        self.intake.record(placement_set, query_class, nanos).await;
    }

    /// Record an execution-time observation via the legacy reference-
    /// tag contract (`"<PS-string>-<QC>"`).
    pub async fn record_execution_time_tagged(&self, tag: &str, nanos: u64) {
        if !self.config.read().await.training {
            return;
        }
        self.intake.record_tagged(tag, nanos).await;
    }

    /// Remove adapters from the known-adapters registry and every row.
    pub async fn drop_placements(&self, adapters: &[AdapterId]) {
        self.table.drop_placements(adapters).await;
    }

    /// Run one refresh pass immediately, without waiting for the
    /// background interval. Useful for tests and the demo binary.
    pub async fn refresh_now(&self) {
        self.refresher.refresh_once().await;
    }

    /// Capture the current routing table as a diagnostic view.
    pub async fn introspect(&self) -> IntrospectionView {
        IntrospectionView::capture(&self.table).await
    }

    /// Replace the running configuration wholesale. Readers on the
    /// request path tolerate the change mid-flight (spec.md §5).
    pub async fn update_config(&self, config: RoutingConfig) {
        *self.config.write().await = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::hasher::{LogicalOperator, LogicalPlan};
    use crate::monitoring::InMemoryMonitoringService;
    use crate::selection::FixedRandomSource;

    fn plan_for(table: &str) -> LogicalPlan {
        LogicalPlan::new().with_operator(LogicalOperator::TableScan {
            qualified_name: table.to_string(),
        })
    }

    /// S1 — cold start: first query of a class returns the
    /// iteration-first candidate and initializes the row with
    /// `Missing` for every candidate.
    #[tokio::test]
    async fn cold_start_returns_first_candidate_and_initializes_row() {
        let mut catalog = InMemoryCatalog::new();
        catalog.add_table("t", vec![1]);
        catalog.add_placement("t", 1, vec![1]);
        catalog.add_placement("t", 2, vec![1]);
        let catalog = Arc::new(catalog);
        let monitoring = InMemoryMonitoringService::shared(25);

        let router = AdaptiveRouter::new(RoutingConfig::default(), catalog, monitoring);
        let chosen = router.route("t", &plan_for("t")).await.unwrap();
        assert_eq!(chosen, PlacementSet::singleton(1));

        let view = router.introspect().await;
        assert_eq!(view.rows.len(), 1);
    }

    /// S2 — after one sample each with no similarity band, refresh
    /// makes the fastest placement deterministic.
    #[tokio::test]
    async fn refresh_converges_to_fastest_without_similarity_band() {
        let mut catalog = InMemoryCatalog::new();
        catalog.add_table("t", vec![1]);
        catalog.add_placement("t", 1, vec![1]);
        catalog.add_placement("t", 2, vec![1]);
        let catalog = Arc::new(catalog);
        let monitoring = InMemoryMonitoringService::shared(25);

        let router = AdaptiveRouter::new(RoutingConfig::default(), catalog, monitoring);
        router.route("t", &plan_for("t")).await.unwrap();

        let qc = classify(&plan_for("t"), RoutingConfig::default().query_class_provider);
        router
            .record_execution_time(PlacementSet::singleton(1), qc.clone(), 30_000_000)
            .await;
        router
            .record_execution_time(PlacementSet::singleton(2), qc.clone(), 60_000_000)
            .await;
        router.refresh_now().await;

        let mut rng = FixedRandomSource(50);
        let chosen = router
            .route_with_random("t", &plan_for("t"), &mut rng)
            .await
            .unwrap();
        assert_eq!(chosen, PlacementSet::singleton(1));
    }

    #[tokio::test]
    async fn no_candidates_is_a_routing_error() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let monitoring = InMemoryMonitoringService::shared(25);
        let router = AdaptiveRouter::new(RoutingConfig::default(), catalog, monitoring);

        let err = router.route("missing", &plan_for("missing")).await.unwrap_err();
        assert!(matches!(err, RoutingError::NoCandidatePlacements { .. }));
    }

    /// S6 — an INSERT plan bypasses classification and the table,
    /// dispatching to every adapter hosting the table.
    #[tokio::test]
    async fn modification_plan_bypasses_table_and_dispatches_to_all_stores() {
        let mut catalog = InMemoryCatalog::new();
        catalog.add_table("t", vec![1]);
        catalog.add_placement("t", 1, vec![1]);
        catalog.add_placement("t", 2, vec![1]);
        let catalog = Arc::new(catalog);
        let monitoring = InMemoryMonitoringService::shared(25);

        let router = AdaptiveRouter::new(RoutingConfig::default(), catalog, monitoring);
        let plan = plan_for("t").with_kind(crate::hasher::StatementKind::Insert);
        let stores = router.route("t", &plan).await.unwrap();
        assert_eq!(stores, PlacementSet::from_adapters([1, 2]));

        let view = router.introspect().await;
        assert!(view.rows.is_empty());
    }

    #[tokio::test]
    async fn merge_plan_is_rejected_before_touching_the_table() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let monitoring = InMemoryMonitoringService::shared(25);
        let router = AdaptiveRouter::new(RoutingConfig::default(), catalog, monitoring);

        let plan = plan_for("t").with_kind(crate::hasher::StatementKind::Merge);
        let err = router.route("t", &plan).await.unwrap_err();
        assert!(matches!(err, RoutingError::UnsupportedOperation));
    }

    /// S5 — dropping an adapter removes it from subsequent rows.
    #[tokio::test]
    async fn drop_placements_removes_adapter_from_future_rows() {
        let mut catalog = InMemoryCatalog::new();
        catalog.add_table("t", vec![1]);
        catalog.add_placement("t", 1, vec![1]);
        catalog.add_placement("t", 2, vec![1]);
        let catalog = Arc::new(catalog);
        let monitoring = InMemoryMonitoringService::shared(25);

        let router = AdaptiveRouter::new(RoutingConfig::default(), catalog, monitoring);
        router.route("t", &plan_for("t")).await.unwrap();
        router.drop_placements(&[2]).await;

        let view = router.introspect().await;
        assert_eq!(view.columns, vec![PlacementSet::singleton(1)]);
    }
}
