//! Routing Table: concurrent map from query class to a row of
//! placement-set weights, refreshed under an exclusive writer lock.
//!
//! Grounded on spec.md §9's "concurrent map with periodic exclusive
//! rewrite" design note; lock discipline mirrors
//! `knhk-autonomic::controller::AutonomicController`'s per-component
//! `Arc<RwLock<_>>` state. Readers never take the writer lock: a row
//! may be up to one refresh cycle stale, which spec.md §5 treats as
//! acceptable.

use crate::types::{AdapterId, PlacementSet, QueryClass, RoutingEvent, RoutingRow, Weight};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Concurrent `QueryClass -> RoutingRow` map, plus the known-adapters
/// registry shared across all rows.
pub struct RoutingTable {
    rows: RwLock<IndexMap<QueryClass, RoutingRow>>,
    known_placements: RwLock<Vec<PlacementSet>>,
    /// Human-readable label per adapter id, mirroring the catalog's own
    /// `adapter_unique_name` (spec.md §3: "mapping `PS` to human
    /// label"). Consulted by the introspection view only; routing
    /// decisions never depend on it.
    adapter_labels: RwLock<BTreeMap<AdapterId, String>>,
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingTable {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(IndexMap::new()),
            known_placements: RwLock::new(Vec::new()),
            adapter_labels: RwLock::new(BTreeMap::new()),
        }
    }

    /// Whether a row exists for `query_class`. Need not observe the
    /// latest refresh.
    pub async fn contains(&self, query_class: &QueryClass) -> bool {
        self.rows.read().await.contains_key(query_class)
    }

    /// Read-only snapshot of the row for `query_class`, if one exists.
    pub async fn get(&self, query_class: &QueryClass) -> Option<RoutingRow> {
        self.rows.read().await.get(query_class).cloned()
    }

    /// Create a row populated with `NoPlacement` for all known
    /// placement sets and `Missing` for the candidate sets, adding any
    /// previously unseen candidates to the known-adapters registry.
    #[instrument(skip(self, candidates))]
    pub async fn initialize_row(&self, query_class: QueryClass, candidates: &[PlacementSet]) {
        let mut known = self.known_placements.write().await;
        for candidate in candidates {
            if !known.contains(candidate) {
                known.push(candidate.clone());
            }
        }
        let known_snapshot = known.clone();
        drop(known);

        let mut row: RoutingRow = IndexMap::new();
        for placement in &known_snapshot {
            let weight = if candidates.contains(placement) {
                Weight::Missing
            } else {
                Weight::NoPlacement
            };
            row.insert(placement.clone(), weight);
        }

        debug!(query_class = %query_class, candidates = candidates.len(), "initializing routing row");
        self.rows.write().await.insert(query_class, row);
    }

    /// Remove `adapters` from the known-adapters registry and from
    /// every row. Rows left with no non-sentinel placement are kept
    /// (they collapse to all-`NoPlacement` until the next refresh finds
    /// no candidates and removes them from future lookups); rows whose
    /// sole placement is dropped shrink, not destruct, per spec.md §3
    /// ("rows are never destroyed except when all their placements
    /// become dropped" — enforced here by removing empty rows).
    #[instrument(skip(self, adapters))]
    pub async fn drop_placements(&self, adapters: &[AdapterId]) {
        if adapters.is_empty() {
            return;
        }
        let adapter_set: BTreeSet<AdapterId> = adapters.iter().copied().collect();

        let mut known = self.known_placements.write().await;
        known.retain(|ps| ps.adapters().all(|a| !adapter_set.contains(&a)));
        drop(known);

        let mut labels = self.adapter_labels.write().await;
        labels.retain(|adapter, _| !adapter_set.contains(adapter));
        drop(labels);

        let mut rows = self.rows.write().await;
        let mut emptied = Vec::new();
        for (query_class, row) in rows.iter_mut() {
            row.retain(|ps, _| ps.adapters().all(|a| !adapter_set.contains(&a)));
            if row.is_empty() {
                emptied.push(query_class.clone());
            }
        }
        for query_class in emptied {
            rows.shift_remove(&query_class);
        }
    }

    /// Forward a routing event to the monitoring service. Intended to
    /// be called fire-and-forget by the intake; never mutates the
    /// table directly (spec.md §4.6 — all updates happen in refresh).
    pub fn on_execution_time(&self, _event: RoutingEvent) {
        // The table itself does not record events; `crate::intake`
        // forwards them to the `MonitoringService`. This method exists
        // to document the table's place in spec.md §4.3's operation
        // list without duplicating the intake's responsibility.
    }

    /// Replace the row for `query_class` wholesale. Called only by the
    /// refresher, which holds no table-wide lock beyond the duration of
    /// each row write — `dropPlacements`/`initializeRow` calls that land
    /// between two row writes of the same refresh cycle are allowed to
    /// interleave with *other* rows, but never with the same row.
    pub async fn replace_row(&self, query_class: QueryClass, row: RoutingRow) {
        self.rows.write().await.insert(query_class, row);
    }

    /// Snapshot of every query class currently in the table.
    pub async fn query_classes(&self) -> Vec<QueryClass> {
        self.rows.read().await.keys().cloned().collect()
    }

    /// Snapshot of every known placement set, in registry order.
    pub async fn known_placements(&self) -> Vec<PlacementSet> {
        self.known_placements.read().await.clone()
    }

    /// Record a human-readable label for an adapter, as surfaced by
    /// `Catalog::adapter_unique_name`. Overwrites any previous label.
    pub async fn register_adapter_label(&self, adapter: AdapterId, label: String) {
        self.adapter_labels.write().await.insert(adapter, label);
    }

    /// Label for an adapter, if the catalog has named one.
    pub async fn adapter_label(&self, adapter: AdapterId) -> Option<String> {
        self.adapter_labels.read().await.get(&adapter).cloned()
    }

    /// Validate that a freshly computed row's non-sentinel weights sum
    /// to 100, logging at error severity if not (spec.md §7). The row
    /// is still emitted regardless.
    pub fn check_row_sum(query_class: &QueryClass, row: &RoutingRow) {
        let has_missing = row.values().any(Weight::is_missing);
        let sum: u32 = row.values().map(Weight::as_share).sum();
        if !has_missing && sum != 0 && sum != 100 {
            warn!(query_class = %query_class, sum, "routing row weights sum to != 100 after refresh");
        }
    }
}

pub type SharedRoutingTable = Arc<RoutingTable>;
