//! Table Refresher: periodic task that recomputes routing
//! distributions from mean execution times.
//!
//! Grounded on `knhk-autonomic::controller::AutonomicController::start`
//! (`tokio::time::interval` + `loop { ticker.tick().await; ... }`,
//! continue-on-error posture — a single class's refresh failure never
//! stops the loop).

use crate::monitoring::{mean_times_by_placement, MonitoringService};
use crate::table::{RoutingTable, SharedRoutingTable};
use crate::types::{PlacementSet, QueryClass, RoutingRow, Weight};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Regime-dependent parameters the row generator needs on each pass.
#[derive(Debug, Clone, Copy)]
pub struct RefresherConfig {
    pub similar_short: u32,
    pub similar_long: u32,
    pub short_long_threshold_nanos: u64,
}

/// Background task that periodically rewrites every row in the table
/// from the monitoring service's retained timing samples.
pub struct TableRefresher {
    table: SharedRoutingTable,
    monitoring: Arc<dyn MonitoringService>,
    config: RefresherConfig,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl TableRefresher {
    pub fn new(
        table: SharedRoutingTable,
        monitoring: Arc<dyn MonitoringService>,
        config: RefresherConfig,
        interval: Duration,
    ) -> Self {
        Self {
            table,
            monitoring,
            config,
            interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the background refresh loop. Returns the join handle so
    /// the caller can await shutdown.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let refresher = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(refresher.interval);
            loop {
                ticker.tick().await;
                if !refresher.running.load(Ordering::SeqCst) {
                    break;
                }
                refresher.refresh_once().await;
            }
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Run a single refresh pass over every query class currently in
    /// the table. Never returns an error: a failure for one class is
    /// logged and the loop continues to the next, matching the
    /// teacher's "MAPE-K cycle failed ... continue running" posture.
    #[instrument(skip(self))]
    pub async fn refresh_once(&self) {
        for query_class in self.table.query_classes().await {
            let points = self.monitoring.data_points(&query_class).await;
            let means = mean_times_by_placement(&points);
            let known = self.table.known_placements().await;
            let old_row = self.table.get(&query_class).await.unwrap_or_default();

            let new_row = build_row(&known, &old_row, &means, self.config);
            RoutingTable::check_row_sum(&query_class, &new_row);
            self.table.replace_row(query_class, new_row).await;
        }
        debug!("refresh cycle complete");
    }
}

/// Build the replacement row for one query class: start with
/// `NoPlacement` for every known placement set, preserve `NoPlacement`
/// for sets that were `NoPlacement` in the old row, and for every
/// other old placement set either copy the generator's weight or fall
/// back to `Missing` (spec.md §4.4 step 3).
fn build_row(
    known: &[PlacementSet],
    old_row: &RoutingRow,
    means: &BTreeMap<PlacementSet, u64>,
    config: RefresherConfig,
) -> RoutingRow {
    let generated = generate_weights(means, config);

    let mut new_row: RoutingRow = IndexMap::new();
    for placement in known {
        let was_no_placement = matches!(old_row.get(placement), None | Some(Weight::NoPlacement));

        let weight = if was_no_placement {
            Weight::NoPlacement
        } else if let Some(percent) = generated.get(placement) {
            Weight::percent(*percent)
        } else {
            Weight::Missing
        };
        new_row.insert(placement.clone(), weight);
    }
    new_row
}

/// Row generator policy: turn a per-placement mean-time map into a
/// percent-weight map, applying the short/long regime switch from
/// spec.md §4.4.
fn generate_weights(
    means: &BTreeMap<PlacementSet, u64>,
    config: RefresherConfig,
) -> BTreeMap<PlacementSet, u8> {
    let Some((fastest_ps, fastest_time)) = fastest(means) else {
        return BTreeMap::new();
    };

    if fastest_time < config.short_long_threshold_nanos && config.similar_short > 0 {
        calc(means, fastest_ps, fastest_time, config.similar_short)
    } else if fastest_time >= config.short_long_threshold_nanos && config.similar_long > 0 {
        calc(means, fastest_ps, fastest_time, config.similar_long)
    } else {
        let mut out = BTreeMap::new();
        for ps in means.keys() {
            out.insert(ps.clone(), 0);
        }
        if fastest_time > 0 {
            out.insert(fastest_ps, 100);
        }
        out
    }
}

/// `fastest_time = min observed mean`, `fastest_PS` its argmin. Ties
/// broken arbitrarily by last-writer-wins, matching the source
/// (spec.md §9 Open Question: preserved as specified, not "fixed").
fn fastest(means: &BTreeMap<PlacementSet, u64>) -> Option<(PlacementSet, u64)> {
    let mut best: Option<(PlacementSet, u64)> = None;
    for (ps, time) in means {
        match &best {
            Some((_, best_time)) if *time > *best_time => {}
            _ => best = Some((ps.clone(), *time)),
        }
    }
    best
}

/// `calc(similar_pct, ...)`: produces the distribution for one regime.
///
/// Uses `Σ mean_time` (not `Σ 1/mean_time`) as the normalization base
/// — intentional per spec.md §4.4/§9, preserved rather than "corrected"
/// even though it means slower included placements get a larger
/// unnormalized share before the reorder step reassigns shares in
/// descending order to ascending-time placements.
fn calc(
    means: &BTreeMap<PlacementSet, u64>,
    fastest_ps: PlacementSet,
    fastest_time: u64,
    similar_pct: u32,
) -> BTreeMap<PlacementSet, u8> {
    let threshold = fastest_time as f64 * (1.0 + similar_pct as f64 / 100.0);

    let mut included: Vec<(PlacementSet, u64)> = means
        .iter()
        .filter(|(_, &time)| (time as f64) <= threshold)
        .map(|(ps, &time)| (ps.clone(), time))
        .collect();
    included.sort_by_key(|(_, time)| *time);

    let excluded: Vec<PlacementSet> = means
        .iter()
        .filter(|(_, &time)| (time as f64) > threshold)
        .map(|(ps, _)| ps.clone())
        .collect();

    let total_time: u64 = included.iter().map(|(_, time)| time).sum();
    let mut shares: Vec<u32> = included
        .iter()
        .map(|(_, time)| {
            if total_time == 0 {
                0
            } else {
                let unnormalized = (*time as f64) / (total_time as f64 / 100.0);
                (unnormalized.floor() as u32).min(100)
            }
        })
        .collect();
    shares.sort_unstable_by(|a, b| b.cmp(a));

    let mut out = BTreeMap::new();
    for ps in &excluded {
        out.insert(ps.clone(), 0u8);
    }

    let total: u32 = shares.iter().sum();
    for ((ps, _), share) in included.iter().zip(shares.iter()) {
        out.insert(ps.clone(), (*share).min(100) as u8);
    }

    if total < 100 {
        let deficit = 100 - total;
        if let Some(entry) = out.get_mut(&fastest_ps) {
            *entry = (*entry as u32 + deficit).min(100) as u8;
        }
    } else if total > 100 {
        error!(total, "row generator shares sum to more than 100");
    }

    out
}
