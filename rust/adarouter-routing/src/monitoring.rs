//! Monitoring service collaborator: records execution-time samples and
//! serves them back out grouped for the refresher.
//!
//! Grounded on `knhk-autonomic::knowledge::KnowledgeBase`'s windowed,
//! `Arc<RwLock<HashMap<..>>>`-backed retention, minus its `sled`
//! persistence: spec.md §3/§6 are explicit that the core persists no
//! history, so the window here is purely in memory.

use crate::types::{DataPoint, PlacementSet, QueryClass, RoutingEvent};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// External service that records routing events and answers queries
/// about retained timing samples.
#[async_trait::async_trait]
pub trait MonitoringService: Send + Sync {
    /// Record a routing event. Called fire-and-forget from the intake
    /// path; must not block the caller on I/O.
    async fn record(&self, event: RoutingEvent);

    /// All retained data points for a query class, across every
    /// placement set observed.
    async fn data_points(&self, query_class: &QueryClass) -> Vec<DataPoint>;
}

/// In-memory `MonitoringService` with a bounded retention window per
/// query class. The window size is the effective moving-average
/// window (spec.md §4.4).
pub struct InMemoryMonitoringService {
    window_size: usize,
    samples: RwLock<std::collections::HashMap<QueryClass, VecDeque<DataPoint>>>,
}

impl InMemoryMonitoringService {
    pub fn new(window_size: u32) -> Self {
        Self {
            window_size: window_size.max(1) as usize,
            samples: RwLock::new(std::collections::HashMap::new()),
        }
    }

    pub fn shared(window_size: u32) -> Arc<Self> {
        Arc::new(Self::new(window_size))
    }
}

#[async_trait::async_trait]
impl MonitoringService for InMemoryMonitoringService {
    async fn record(&self, event: RoutingEvent) {
        debug!(query_class = %event.query_class, placement_set = %event.placement_set, nanos = event.nanos, "recording routing event");
        let mut samples = self.samples.write().await;
        let window = samples.entry(event.query_class.clone()).or_default();
        window.push_back(DataPoint {
            query_class: event.query_class,
            placement_set: event.placement_set,
            nanos: event.nanos,
        });
        while window.len() > self.window_size {
            window.pop_front();
        }
    }

    async fn data_points(&self, query_class: &QueryClass) -> Vec<DataPoint> {
        self.samples
            .read()
            .await
            .get(query_class)
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Compute the arithmetic mean of nanosecond times per placement set
/// from a batch of data points, as the refresher's first step
/// requires.
pub fn mean_times_by_placement(
    points: &[DataPoint],
) -> std::collections::BTreeMap<PlacementSet, u64> {
    let mut sums: std::collections::BTreeMap<PlacementSet, (u64, u64)> = Default::default();
    for point in points {
        let entry = sums.entry(point.placement_set.clone()).or_insert((0, 0));
        entry.0 += point.nanos;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(ps, (sum, count))| (ps, sum / count.max(1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn window_evicts_oldest_samples() {
        let svc = InMemoryMonitoringService::new(2);
        let qc = QueryClass::new("C1");
        let ps = PlacementSet::singleton(1);

        for nanos in [10, 20, 30] {
            svc.record(RoutingEvent {
                query_class: qc.clone(),
                placement_set: ps.clone(),
                nanos,
            })
            .await;
        }

        let points = svc.data_points(&qc).await;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].nanos, 20);
        assert_eq!(points[1].nanos, 30);
    }

    #[test]
    fn mean_times_groups_by_placement() {
        let qc = QueryClass::new("C1");
        let ps1 = PlacementSet::singleton(1);
        let ps2 = PlacementSet::singleton(2);
        let points = vec![
            DataPoint {
                query_class: qc.clone(),
                placement_set: ps1.clone(),
                nanos: 10,
            },
            DataPoint {
                query_class: qc.clone(),
                placement_set: ps1.clone(),
                nanos: 20,
            },
            DataPoint {
                query_class: qc,
                placement_set: ps2.clone(),
                nanos: 100,
            },
        ];

        let means = mean_times_by_placement(&points);
        assert_eq!(means[&ps1], 15);
        assert_eq!(means[&ps2], 100);
    }
}
