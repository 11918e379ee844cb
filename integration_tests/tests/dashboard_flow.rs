mod common;

use std::sync::Arc;

use hydromap_core::config::AnalyticsConfig;
use hydromap_core::schema::{AnalyticsSummary, AssetStatus, AssetType};
use hydromap_core::{
    AnalyticsOrigin, AnalyticsSource, Category, Dashboard, DashboardConfig, FilterState, Layer,
};

#[test]
fn texas_filter_narrows_assets_and_analytics() -> anyhow::Result<()> {
    let mut dashboard = common::loaded_dashboard()?;
    dashboard.set_filter(FilterState::default().with_regions(["Texas"]));

    let view = dashboard.view();
    let ids: Vec<&str> = view.assets.iter().map(|asset| asset.id.as_str()).collect();
    assert_eq!(
        ids,
        ["tx-permian", "tx-gulf-pipe", "tx-houston-hub", "tx-amarillo"]
    );

    let summary = &view.analytics;
    assert_eq!(view.analytics_origin, AnalyticsOrigin::Local);
    assert_eq!(summary.total_assets, 4);
    assert_eq!(summary.total_capacity, 660.0);
    assert_eq!(summary.active_projects, 2);
    assert_eq!(summary.average_efficiency, 69.0);
    assert_eq!(summary.total_investment, 1970.0);

    let types: Vec<(AssetType, usize)> = summary
        .type_distribution
        .iter()
        .map(|share| (share.asset_type, share.count))
        .collect();
    assert_eq!(
        types,
        [
            (AssetType::HydrogenPlant, 2),
            (AssetType::Pipeline, 1),
            (AssetType::DistributionHub, 1),
        ]
    );
    assert_eq!(summary.region_distribution.len(), 1);
    assert_eq!(summary.region_distribution[0].capacity, 660.0);

    let trend: Vec<(i32, f64)> = summary
        .capacity_trend
        .iter()
        .map(|point| (point.year, point.capacity))
        .collect();
    assert_eq!(trend, [(2015, 300.0), (2021, 420.0), (2024, 460.0)]);

    // The Amarillo record is filtered in but has no usable coordinates.
    let asset_points = view
        .points
        .iter()
        .filter(|point| matches!(point.entity, hydromap_core::EntityRef::Asset(_)))
        .count();
    assert_eq!(asset_points, 3);
    Ok(())
}

#[test]
fn filters_combine_across_dimensions() -> anyhow::Result<()> {
    let mut dashboard = common::loaded_dashboard()?;
    dashboard.set_filter(
        FilterState::default()
            .with_types([AssetType::HydrogenPlant, AssetType::StorageFacility])
            .with_status([AssetStatus::Operational, AssetStatus::Planned])
            .with_capacity(Some(100.0), None),
    );
    let view = dashboard.view();
    let ids: Vec<&str> = view.assets.iter().map(|asset| asset.id.as_str()).collect();
    assert_eq!(ids, ["tx-permian", "ca-cavern", "tx-amarillo"]);

    dashboard.update_filter(|filter| filter.search = "desert green".into());
    let view = dashboard.view();
    assert!(view.assets.is_empty(), "Mojave is below the capacity bound");

    dashboard.update_filter(|filter| filter.capacity_range = Default::default());
    let view = dashboard.view();
    let ids: Vec<&str> = view.assets.iter().map(|asset| asset.id.as_str()).collect();
    assert_eq!(ids, ["ca-mojave"]);
    Ok(())
}

#[test]
fn each_layer_toggle_is_isolated() -> anyhow::Result<()> {
    let mut dashboard = common::loaded_dashboard()?;
    let baseline = dashboard.view();
    assert_eq!(baseline.assets.len(), 8);
    assert_eq!(baseline.points.len(), 16);

    let count = |points: &[hydromap_core::MapPoint], category: Category| {
        points
            .iter()
            .filter(|point| point.category == category)
            .count()
    };

    for layer in Layer::ALL {
        dashboard.toggle_layer(layer);
        let view = dashboard.view();
        for category in Category::ALL {
            let expected = if Layer::for_category(category) == Some(layer) {
                0
            } else {
                count(&baseline.points, category)
            };
            assert_eq!(
                count(&view.points, category),
                expected,
                "hiding {layer:?} changed {category:?}"
            );
        }
        dashboard.toggle_layer(layer);
    }

    let restored = dashboard.view();
    assert_eq!(restored.points, baseline.points);
    Ok(())
}

#[test]
fn layer_counts_ignore_filters_and_toggles() -> anyhow::Result<()> {
    let mut dashboard = common::loaded_dashboard()?;
    dashboard.set_filter(FilterState::default().with_regions(["Florida"]));
    dashboard.set_layer(Layer::HydrogenPlant, false);

    let view = dashboard.view();
    assert_eq!(view.layer_counts.get(Layer::HydrogenPlant), 6);
    assert_eq!(view.layer_counts.get(Layer::StorageFacility), 2);
    assert_eq!(view.layer_counts.get(Layer::Pipeline), 1);
    assert_eq!(view.layer_counts.get(Layer::DistributionHub), 2);
    assert_eq!(view.layer_counts.get(Layer::RenewableSources), 2);
    assert_eq!(view.layer_counts.get(Layer::DemandCenters), 2);
    Ok(())
}

#[test]
fn recommendations_stay_visible_with_every_layer_off() -> anyhow::Result<()> {
    let mut dashboard = common::loaded_dashboard()?;
    for layer in Layer::ALL {
        dashboard.set_layer(layer, false);
    }
    let view = dashboard.view();
    assert!(view.assets.is_empty());
    assert_eq!(view.points.len(), 3);
    assert!(view
        .points
        .iter()
        .all(|point| point.category == Category::Recommendation));
    assert_eq!(view.recommendations.len(), 3);
    Ok(())
}

#[test]
fn server_analytics_are_preferred_and_compared() -> anyhow::Result<()> {
    let config = DashboardConfig {
        analytics: AnalyticsConfig {
            source: AnalyticsSource::ServerWithLocalFallback,
            ..AnalyticsConfig::default()
        },
        ..DashboardConfig::clone(&common::test_config())
    };
    let mut dashboard = common::load_all(Dashboard::new(Arc::new(config)))?;

    let view = dashboard.view();
    assert_eq!(view.analytics_origin, AnalyticsOrigin::Local);
    assert_eq!(view.analytics.total_capacity, 1325.0);
    assert_eq!(view.analytics.average_efficiency, 71.8);

    let server: AnalyticsSummary = common::fixture("analytics.json")?;
    dashboard.set_server_analytics(server);
    let view = dashboard.view();
    assert_eq!(view.analytics_origin, AnalyticsOrigin::Server);
    assert_eq!(view.analytics.total_capacity, 1400.0);
    let metrics: Vec<&str> = view.divergences.iter().map(|d| d.metric).collect();
    assert_eq!(metrics, ["totalCapacity"]);

    // A narrowed view describes a different set: recompute, nothing to compare.
    dashboard.set_filter(FilterState::default().with_regions(["Texas"]));
    let view = dashboard.view();
    assert!(view.divergences.is_empty());
    assert_eq!(view.analytics_origin, AnalyticsOrigin::Local);
    assert_eq!(view.analytics.total_capacity, 660.0);
    assert_eq!(view.analytics.region_distribution.len(), 1);
    Ok(())
}
