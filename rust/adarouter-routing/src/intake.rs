//! Execution-Time Intake: receives per-execution timing samples and
//! forwards them to the monitoring service.
//!
//! The fast path never mutates the routing table directly; all updates
//! happen in the periodic refresh (spec.md §4.6), which keeps request
//! handling free of contention.

use crate::monitoring::MonitoringService;
use crate::types::{PlacementSet, QueryClass, RoutingEvent};
use std::sync::Arc;
use tracing::warn;

/// Receives execution-time callbacks and forwards them to a
/// [`MonitoringService`] as structured [`RoutingEvent`]s.
pub struct ExecutionTimeIntake {
    monitoring: Arc<dyn MonitoringService>,
}

impl ExecutionTimeIntake {
    pub fn new(monitoring: Arc<dyn MonitoringService>) -> Self {
        Self { monitoring }
    }

    /// Record a timing sample directly, bypassing the string tag.
    /// This is the structured alternative spec.md §9 recommends new
    /// integrations use instead of string-splitting a reference tag.
    pub async fn record(&self, placement_set: PlacementSet, query_class: QueryClass, nanos: u64) {
        self.monitoring
            .record(RoutingEvent {
                query_class,
                placement_set,
                nanos,
            })
            .await;
    }

    /// Legacy entry point matching the execution-time monitor's
    /// subscription contract: a reference tag of the form
    /// `"<PS-string>-<QC>"` plus the elapsed nanoseconds. The `PS` is
    /// rendered as a bracketed comma-separated list, so the tag is
    /// parsed by locating the first `-` *after* the closing bracket
    /// (spec.md §9 — preserved as the source's own substring
    /// arithmetic, not emulated further).
    pub async fn record_tagged(&self, tag: &str, nanos: u64) {
        match parse_tag(tag) {
            Some((placement_set, query_class)) => {
                self.record(placement_set, query_class, nanos).await;
            }
            None => warn!(tag, "failed to parse execution-time reference tag"),
        }
    }
}

/// Parse a `"<PS-string>-<QC>"` reference tag into its placement set
/// and query class.
fn parse_tag(tag: &str) -> Option<(PlacementSet, QueryClass)> {
    let close = tag.find(']')?;
    let (ps_part, rest) = tag.split_at(close + 1);
    let rest = rest.strip_prefix('-')?;
    if rest.is_empty() {
        return None;
    }

    let inner = ps_part.strip_prefix('[')?.strip_suffix(']')?;
    let adapters: Option<Vec<u32>> = if inner.trim().is_empty() {
        Some(Vec::new())
    } else {
        inner
            .split(',')
            .map(|s| s.trim().parse::<u32>().ok())
            .collect()
    };
    let adapters = adapters?;

    Some((PlacementSet::from_adapters(adapters), QueryClass::new(rest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::InMemoryMonitoringService;

    #[test]
    fn parses_bracketed_tag() {
        let (ps, qc) = parse_tag("[1, 2]-C1").unwrap();
        assert_eq!(ps, PlacementSet::from_adapters([1, 2]));
        assert_eq!(qc.as_str(), "C1");
    }

    #[test]
    fn rejects_tag_without_trailing_class() {
        assert!(parse_tag("[1, 2]-").is_none());
    }

    #[test]
    fn rejects_tag_without_brackets() {
        assert!(parse_tag("1,2-C1").is_none());
    }

    #[tokio::test]
    async fn record_tagged_forwards_to_monitoring_service() {
        let monitoring = InMemoryMonitoringService::shared(25);
        let intake = ExecutionTimeIntake::new(monitoring.clone());

        intake.record_tagged("[3]-C7", 42).await;

        let points = monitoring.data_points(&QueryClass::new("C7")).await;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].nanos, 42);
        assert_eq!(points[0].placement_set, PlacementSet::singleton(3));
    }
}
