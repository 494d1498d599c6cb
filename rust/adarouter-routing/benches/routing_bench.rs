//! Benchmarks for `classify` and `refresh`, mirroring the teacher's
//! `benches/mape_k_latency.rs`.

use adarouter_config::QueryClassProvider;
use adarouter_routing::catalog::InMemoryCatalog;
use adarouter_routing::hasher::{classify, LogicalOperator, LogicalPlan};
use adarouter_routing::monitoring::InMemoryMonitoringService;
use adarouter_routing::types::PlacementSet;
use adarouter_routing::AdaptiveRouter;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn bench_classify(c: &mut Criterion) {
    let plan = LogicalPlan::new()
        .with_operator(LogicalOperator::TableScan {
            qualified_name: "orders".to_string(),
        })
        .with_operator(LogicalOperator::Filter)
        .with_operator(LogicalOperator::Project { arity: 4 })
        .with_operator(LogicalOperator::Sort);

    c.bench_function("classify_structural_shuttle", |b| {
        b.iter(|| classify(black_box(&plan), QueryClassProvider::StructuralShuttle))
    });

    c.bench_function("classify_parameterizer", |b| {
        b.iter(|| classify(black_box(&plan), QueryClassProvider::Parameterizer))
    });
}

fn bench_refresh(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let mut catalog = InMemoryCatalog::new();
    catalog.add_table("orders", vec![1, 2, 3]);
    catalog.add_placement("orders", 1, vec![1, 2, 3]);
    catalog.add_placement("orders", 2, vec![1, 2, 3]);
    let catalog = Arc::new(catalog);
    let monitoring = InMemoryMonitoringService::shared(25);

    let router = runtime.block_on(async {
        let router = AdaptiveRouter::new(
            adarouter_config::RoutingConfig::default(),
            catalog,
            monitoring,
        );
        for i in 0..100u32 {
            let qc = classify(
                &LogicalPlan::new().with_operator(LogicalOperator::TableScan {
                    qualified_name: format!("orders{i}"),
                }),
                QueryClassProvider::Parameterizer,
            );
            router
                .record_execution_time(PlacementSet::singleton(1), qc.clone(), 30_000_000)
                .await;
            router
                .record_execution_time(PlacementSet::singleton(2), qc, 60_000_000)
                .await;
        }
        router
    });

    c.bench_function("refresh_100_classes", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(router.refresh_now().await);
        })
    });
}

criterion_group!(benches, bench_classify, bench_refresh);
criterion_main!(benches);
