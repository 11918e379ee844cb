//! Per-category visibility toggles.
//!
//! Layers are a coarse gate applied on top of attribute filtering: an entity
//! is rendered or counted only when its layer is on *and* it passes the
//! filter (for the categories the filter applies to).

use bitflags::bitflags;
use serde::Deserialize;

use crate::category::Category;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LayerState: u8 {
        const HYDROGEN_PLANT = 1 << 0;
        const STORAGE_FACILITY = 1 << 1;
        const PIPELINE = 1 << 2;
        const DISTRIBUTION_HUB = 1 << 3;
        const RENEWABLE_SOURCES = 1 << 4;
        const DEMAND_CENTERS = 1 << 5;
    }
}

impl Default for LayerState {
    fn default() -> Self {
        LayerState::all()
    }
}

/// One of the six fixed map layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    HydrogenPlant,
    StorageFacility,
    Pipeline,
    DistributionHub,
    RenewableSources,
    DemandCenters,
}

impl Layer {
    pub const ALL: [Layer; 6] = [
        Layer::HydrogenPlant,
        Layer::StorageFacility,
        Layer::Pipeline,
        Layer::DistributionHub,
        Layer::RenewableSources,
        Layer::DemandCenters,
    ];

    pub fn flag(self) -> LayerState {
        match self {
            Layer::HydrogenPlant => LayerState::HYDROGEN_PLANT,
            Layer::StorageFacility => LayerState::STORAGE_FACILITY,
            Layer::Pipeline => LayerState::PIPELINE,
            Layer::DistributionHub => LayerState::DISTRIBUTION_HUB,
            Layer::RenewableSources => LayerState::RENEWABLE_SOURCES,
            Layer::DemandCenters => LayerState::DEMAND_CENTERS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Layer::HydrogenPlant => "Hydrogen Plants",
            Layer::StorageFacility => "Storage Facilities",
            Layer::Pipeline => "Pipelines",
            Layer::DistributionHub => "Distribution Hubs",
            Layer::RenewableSources => "Renewable Sources",
            Layer::DemandCenters => "Demand Centers",
        }
    }

    /// Layer gating a category. Recommendations have no layer of their own.
    pub fn for_category(category: Category) -> Option<Layer> {
        match category {
            Category::HydrogenPlant => Some(Layer::HydrogenPlant),
            Category::StorageFacility => Some(Layer::StorageFacility),
            Category::Pipeline => Some(Layer::Pipeline),
            Category::DistributionHub => Some(Layer::DistributionHub),
            Category::RenewableSource => Some(Layer::RenewableSources),
            Category::DemandCenter => Some(Layer::DemandCenters),
            Category::Recommendation => None,
        }
    }
}

impl LayerState {
    pub fn is_on(&self, layer: Layer) -> bool {
        self.contains(layer.flag())
    }

    /// Flip exactly one layer.
    pub fn toggle_layer(&mut self, layer: Layer) {
        self.toggle(layer.flag());
    }

    pub fn set_layer(&mut self, layer: Layer, visible: bool) {
        self.set(layer.flag(), visible);
    }
}

pub fn is_visible(category: Category, layers: &LayerState) -> bool {
    match Layer::for_category(category) {
        Some(layer) => layers.is_on(layer),
        None => true,
    }
}

/// Initial layer toggles as written in the dashboard config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerDefaults {
    pub hydrogen_plant: bool,
    pub storage_facility: bool,
    pub pipeline: bool,
    pub distribution_hub: bool,
    pub renewable_sources: bool,
    pub demand_centers: bool,
}

impl Default for LayerDefaults {
    fn default() -> Self {
        Self {
            hydrogen_plant: true,
            storage_facility: true,
            pipeline: true,
            distribution_hub: true,
            renewable_sources: true,
            demand_centers: true,
        }
    }
}

impl From<LayerDefaults> for LayerState {
    fn from(value: LayerDefaults) -> Self {
        let mut state = LayerState::empty();
        state.set(LayerState::HYDROGEN_PLANT, value.hydrogen_plant);
        state.set(LayerState::STORAGE_FACILITY, value.storage_facility);
        state.set(LayerState::PIPELINE, value.pipeline);
        state.set(LayerState::DISTRIBUTION_HUB, value.distribution_hub);
        state.set(LayerState::RENEWABLE_SOURCES, value.renewable_sources);
        state.set(LayerState::DEMAND_CENTERS, value.demand_centers);
        state
    }
}

/// Record counts per layer, independent of filters and toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerCounts {
    counts: [usize; 6],
}

impl LayerCounts {
    pub fn add(&mut self, layer: Layer, count: usize) {
        self.counts[layer as usize] += count;
    }

    pub fn get(&self, layer: Layer) -> usize {
        self.counts[layer as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_only_one_layer() {
        let mut layers = LayerState::default();
        layers.toggle_layer(Layer::Pipeline);
        for layer in Layer::ALL {
            assert_eq!(layers.is_on(layer), layer != Layer::Pipeline, "{layer:?}");
        }
        layers.toggle_layer(Layer::Pipeline);
        assert_eq!(layers, LayerState::all());
    }

    #[test]
    fn every_category_maps_to_its_flag() {
        let mut layers = LayerState::all();
        layers.set_layer(Layer::RenewableSources, false);
        assert!(!is_visible(Category::RenewableSource, &layers));
        assert!(is_visible(Category::DemandCenter, &layers));
        assert!(is_visible(Category::HydrogenPlant, &layers));
    }

    #[test]
    fn recommendations_are_never_layer_gated() {
        assert!(is_visible(Category::Recommendation, &LayerState::empty()));
    }

    #[test]
    fn defaults_convert_field_by_field() {
        let defaults = LayerDefaults {
            demand_centers: false,
            ..LayerDefaults::default()
        };
        let layers = LayerState::from(defaults);
        assert!(!layers.is_on(Layer::DemandCenters));
        assert!(layers.is_on(Layer::HydrogenPlant));
    }
}
