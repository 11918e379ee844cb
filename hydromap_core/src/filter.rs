//! Attribute filter over infrastructure assets.
//!
//! Every dimension is inclusive by default: an empty set (or blank search
//! text) places no restriction on that dimension. Only [`InfrastructureAsset`]
//! is filtered; marker feeds, demand centers and recommendations are gated by
//! layers alone.

use std::collections::BTreeSet;

use hydromap_schema::{AssetStatus, AssetType, InfrastructureAsset};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CapacityRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub types: BTreeSet<AssetType>,
    pub regions: BTreeSet<String>,
    pub status: BTreeSet<AssetStatus>,
    pub capacity_range: CapacityRange,
    /// Case-insensitive substring matched against name, owner and region.
    pub search: String,
}

impl FilterState {
    pub fn with_types(mut self, types: impl IntoIterator<Item = AssetType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn with_regions<S: Into<String>>(mut self, regions: impl IntoIterator<Item = S>) -> Self {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: impl IntoIterator<Item = AssetStatus>) -> Self {
        self.status = status.into_iter().collect();
        self
    }

    pub fn with_capacity(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.capacity_range = CapacityRange { min, max };
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.types.is_empty()
            && self.regions.is_empty()
            && self.status.is_empty()
            && self.capacity_range.min.is_none()
            && self.capacity_range.max.is_none()
            && self.search.trim().is_empty()
    }
}

pub fn matches(asset: &InfrastructureAsset, filter: &FilterState) -> bool {
    if !filter.types.is_empty() && !filter.types.contains(&asset.asset_type) {
        return false;
    }
    if !filter.regions.is_empty() && !filter.regions.contains(&asset.region) {
        return false;
    }
    if !filter.status.is_empty() && !filter.status.contains(&asset.status) {
        return false;
    }
    // An asset without capacity data is never hidden by a capacity bound.
    if let Some(capacity) = asset.capacity {
        if let Some(min) = filter.capacity_range.min {
            if capacity < min {
                return false;
            }
        }
        if let Some(max) = filter.capacity_range.max {
            if capacity > max {
                return false;
            }
        }
    }
    matches_search(asset, &filter.search)
}

fn matches_search(asset: &InfrastructureAsset, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
    contains(asset.name.as_str())
        || contains(asset.region.as_str())
        || asset.owner.as_deref().is_some_and(contains)
}

pub fn filter_assets<'a>(
    assets: &'a [InfrastructureAsset],
    filter: &'a FilterState,
) -> impl Iterator<Item = &'a InfrastructureAsset> + 'a {
    assets.iter().filter(move |asset| matches(asset, filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_assets() -> Vec<InfrastructureAsset> {
        vec![
            InfrastructureAsset::new(
                "1",
                "Permian Electrolyzer",
                AssetType::HydrogenPlant,
                AssetStatus::Operational,
                "Texas",
            )
            .with_capacity(50.0)
            .with_owner("Lone Star H2"),
            InfrastructureAsset::new(
                "2",
                "Gulf Trunk Line",
                AssetType::Pipeline,
                AssetStatus::Planned,
                "Texas",
            ),
            InfrastructureAsset::new(
                "3",
                "Central Valley Storage",
                AssetType::StorageFacility,
                AssetStatus::UnderConstruction,
                "California",
            )
            .with_capacity(500.0),
        ]
    }

    #[test]
    fn unrestricted_filter_matches_everything() {
        let filter = FilterState::default();
        assert!(filter.is_unrestricted());
        for asset in sample_assets() {
            assert!(matches(&asset, &filter), "{}", asset.id);
        }
    }

    #[test]
    fn dimensions_combine_with_and() {
        let filter = FilterState::default()
            .with_regions(["Texas"])
            .with_status([AssetStatus::Operational]);
        let assets = sample_assets();
        let ids: Vec<_> = filter_assets(&assets, &filter)
            .map(|asset| asset.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn absent_capacity_never_fails_capacity_bounds() {
        let assets = sample_assets();
        let pipeline = &assets[1];
        for (min, max) in [
            (Some(1_000.0), None),
            (None, Some(0.0)),
            (Some(10.0), Some(20.0)),
        ] {
            let filter = FilterState::default().with_capacity(min, max);
            assert!(matches(pipeline, &filter));
        }
    }

    #[test]
    fn capacity_bounds_are_inclusive() {
        let assets = sample_assets();
        let plant = &assets[0];
        assert!(matches(plant, &FilterState::default().with_capacity(Some(50.0), Some(50.0))));
        assert!(!matches(plant, &FilterState::default().with_capacity(Some(50.1), None)));
        assert!(!matches(plant, &FilterState::default().with_capacity(None, Some(49.9))));
    }

    #[test]
    fn search_covers_name_owner_and_region() {
        let assets = sample_assets();
        let by_owner = FilterState::default().with_search("lone star");
        assert_eq!(filter_assets(&assets, &by_owner).count(), 1);

        let by_region = FilterState::default().with_search("CALIF");
        let ids: Vec<_> = filter_assets(&assets, &by_region)
            .map(|asset| asset.id.as_str())
            .collect();
        assert_eq!(ids, vec!["3"]);

        let blank = FilterState::default().with_search("   ");
        assert_eq!(filter_assets(&assets, &blank).count(), 3);
    }
}
