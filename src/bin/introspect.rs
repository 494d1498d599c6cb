//! Demo binary: wires an `InMemoryCatalog` and
//! `InMemoryMonitoringService` into an `AdaptiveRouter`, runs a
//! handful of queries through it, and prints the introspection view.

use adarouter::{
    catalog::InMemoryCatalog, hasher::LogicalOperator, hasher::LogicalPlan,
    monitoring::InMemoryMonitoringService, types::PlacementSet, AdaptiveRouter, RoutingConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = adarouter_config::load_config(None)?;

    let mut catalog = InMemoryCatalog::new();
    catalog.add_table("orders", vec![1, 2, 3]);
    catalog.add_placement("orders", 1, vec![1, 2, 3]);
    catalog.add_placement("orders", 2, vec![1, 2, 3]);
    catalog.name_adapter(1, "mongo-primary");
    catalog.name_adapter(2, "mongo-replica");
    let catalog = Arc::new(catalog);

    let monitoring = InMemoryMonitoringService::shared(config.window_size);
    let router = AdaptiveRouter::new(config, catalog, monitoring);
    router.start().await;

    let plan = LogicalPlan::new().with_operator(LogicalOperator::TableScan {
        qualified_name: "orders".to_string(),
    });

    let chosen = router.route("orders", &plan).await?;
    println!("first selection: {chosen}");

    let qc = adarouter::hasher::classify(&plan, adarouter::QueryClassProvider::Parameterizer);
    router
        .record_execution_time(PlacementSet::singleton(1), qc.clone(), 30_000_000)
        .await;
    router
        .record_execution_time(PlacementSet::singleton(2), qc, 60_000_000)
        .await;
    router.refresh_now().await;

    let view = router.introspect().await;
    println!("{view}");

    tokio::time::sleep(Duration::from_millis(50)).await;
    router.stop();

    Ok(())
}
