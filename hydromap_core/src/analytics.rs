//! Aggregates over the filtered and visible asset set.
//!
//! Everything here is a pure function of its input; callers recompute
//! whenever the store, filter or layers move.

use std::collections::BTreeMap;

use hydromap_schema::{
    AnalyticsSummary, AssetStatus, AssetType, CapacityPoint, InfrastructureAsset, RegionShare,
    TypeShare,
};

pub fn summarize<'a, I>(assets: I) -> AnalyticsSummary
where
    I: IntoIterator<Item = &'a InfrastructureAsset>,
{
    let assets: Vec<&InfrastructureAsset> = assets.into_iter().collect();

    let total_capacity: f64 = assets.iter().filter_map(|asset| asset.capacity).sum();
    let active_projects = assets
        .iter()
        .filter(|asset| asset.status == AssetStatus::Operational)
        .count();
    let total_investment: f64 = assets.iter().filter_map(|asset| asset.estimated_cost).sum();

    AnalyticsSummary {
        total_assets: assets.len(),
        total_capacity,
        active_projects,
        average_efficiency: average_efficiency(&assets),
        total_investment,
        type_distribution: type_distribution(&assets),
        region_distribution: region_distribution(&assets),
        capacity_trend: capacity_trend(&assets),
    }
}

/// Mean over assets that report an efficiency; the rest are left out of
/// both sides of the division. Zero when nobody reports one.
pub fn average_efficiency(assets: &[&InfrastructureAsset]) -> f64 {
    let (sum, count) = assets
        .iter()
        .filter_map(|asset| asset.efficiency)
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Share of each asset type present, in [`AssetType::ALL`] order.
pub fn type_distribution(assets: &[&InfrastructureAsset]) -> Vec<TypeShare> {
    let total = assets.len();
    if total == 0 {
        return Vec::new();
    }
    let mut counts: BTreeMap<AssetType, usize> = BTreeMap::new();
    for asset in assets {
        *counts.entry(asset.asset_type).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(asset_type, count)| TypeShare {
            asset_type,
            count,
            percentage: 100.0 * count as f64 / total as f64,
        })
        .collect()
}

/// Count and summed capacity per region, ordered by region name. Assets
/// without capacity count toward `count` and add nothing to `capacity`.
pub fn region_distribution(assets: &[&InfrastructureAsset]) -> Vec<RegionShare> {
    let mut regions: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for asset in assets {
        let entry = regions.entry(asset.region.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += asset.capacity.unwrap_or(0.0);
    }
    regions
        .into_iter()
        .map(|(region, (count, capacity))| RegionShare {
            region: region.to_string(),
            count,
            capacity,
        })
        .collect()
}

/// Cumulative capacity by build year, ascending. Assets missing either the
/// year or the capacity do not contribute.
pub fn capacity_trend(assets: &[&InfrastructureAsset]) -> Vec<CapacityPoint> {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for asset in assets {
        if let (Some(year), Some(capacity)) = (asset.year_built, asset.capacity) {
            *by_year.entry(year).or_default() += capacity;
        }
    }
    let mut running = 0.0;
    by_year
        .into_iter()
        .map(|(year, added)| {
            running += added;
            CapacityPoint {
                year,
                capacity: running,
            }
        })
        .collect()
}

/// A scalar KPI on which a local and a server summary disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsDivergence {
    pub metric: &'static str,
    pub local: f64,
    pub server: f64,
}

/// Compare the scalar KPIs of two summaries. `tolerance` is relative to the
/// larger magnitude, with an absolute floor of `tolerance` itself.
pub fn compare(
    local: &AnalyticsSummary,
    server: &AnalyticsSummary,
    tolerance: f64,
) -> Vec<AnalyticsDivergence> {
    let metrics = [
        ("totalCapacity", local.total_capacity, server.total_capacity),
        (
            "activeProjects",
            local.active_projects as f64,
            server.active_projects as f64,
        ),
        (
            "averageEfficiency",
            local.average_efficiency,
            server.average_efficiency,
        ),
        (
            "totalInvestment",
            local.total_investment,
            server.total_investment,
        ),
    ];
    metrics
        .into_iter()
        .filter(|(_, local, server)| {
            let scale = local.abs().max(server.abs()).max(1.0);
            (local - server).abs() > tolerance * scale
        })
        .map(|(metric, local, server)| AnalyticsDivergence {
            metric,
            local,
            server,
        })
        .collect()
}
