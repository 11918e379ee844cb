use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use hydromap_core::schema::{AssetStatus, AssetType, InfrastructureAsset};
use hydromap_core::{Dashboard, DashboardConfig, Fetched, Layer};

const REGIONS: [&str; 4] = ["California", "Texas", "New York", "Florida"];

fn synthetic_assets(count: usize) -> Vec<InfrastructureAsset> {
    (0..count)
        .map(|i| {
            let asset_type = AssetType::ALL[i % AssetType::ALL.len()];
            let status = match i % 3 {
                0 => AssetStatus::Operational,
                1 => AssetStatus::UnderConstruction,
                _ => AssetStatus::Planned,
            };
            InfrastructureAsset::new(
                i.to_string(),
                format!("Site {i}"),
                asset_type,
                status,
                REGIONS[i % REGIONS.len()],
            )
            .with_position(25.0 + (i % 20) as f64, -120.0 + (i % 45) as f64)
            .with_capacity((i % 500) as f64)
            .with_efficiency(50.0 + (i % 50) as f64)
            .with_year_built(2000 + (i % 25) as i32)
        })
        .collect()
}

fn bench_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("view");

    for size in [100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("recompute", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut dashboard = Dashboard::new(Arc::new(DashboardConfig::default()));
                    dashboard.load(Fetched::Assets(synthetic_assets(size)));
                    dashboard
                },
                |mut dashboard| {
                    dashboard.toggle_layer(Layer::Pipeline);
                    dashboard.view()
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(view_benches, bench_view);
criterion_main!(view_benches);
