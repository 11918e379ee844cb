//! Entity identity and the common "renderable point" capability shared by
//! every record the dashboard can place on the map.

use std::fmt;

use hydromap_schema::{
    AssetType, DemandCenter, HydrogenPlantMarker, InfrastructureAsset, LatLng, Recommendation,
    RenewableMarker,
};

/// A fetchable dataset. Each dataset has its own cache, fetch status and
/// identifier space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dataset {
    Assets,
    HydrogenPlants,
    Renewables,
    DemandCenters,
    Recommendations,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::Assets,
        Dataset::HydrogenPlants,
        Dataset::Renewables,
        Dataset::DemandCenters,
        Dataset::Recommendations,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dataset::Assets => "assets",
            Dataset::HydrogenPlants => "hydrogen_plants",
            Dataset::Renewables => "renewables",
            Dataset::DemandCenters => "demand_centers",
            Dataset::Recommendations => "recommendations",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual category of an entity on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    HydrogenPlant,
    StorageFacility,
    Pipeline,
    DistributionHub,
    RenewableSource,
    DemandCenter,
    Recommendation,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::HydrogenPlant,
        Category::StorageFacility,
        Category::Pipeline,
        Category::DistributionHub,
        Category::RenewableSource,
        Category::DemandCenter,
        Category::Recommendation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::HydrogenPlant => "hydrogen-plant",
            Category::StorageFacility => "storage-facility",
            Category::Pipeline => "pipeline",
            Category::DistributionHub => "distribution-hub",
            Category::RenewableSource => "renewable-source",
            Category::DemandCenter => "demand-center",
            Category::Recommendation => "recommendation",
        }
    }
}

impl From<AssetType> for Category {
    fn from(value: AssetType) -> Self {
        match value {
            AssetType::HydrogenPlant => Category::HydrogenPlant,
            AssetType::StorageFacility => Category::StorageFacility,
            AssetType::Pipeline => Category::Pipeline,
            AssetType::DistributionHub => Category::DistributionHub,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable address of a single entity.
///
/// The variant carries the dataset, so a renewable marker and a hydrogen plant
/// marker that share the numeric id `7` are different entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    Asset(String),
    HydrogenPlant(u64),
    Renewable(u64),
    DemandCenter(String),
    Recommendation(String),
}

impl EntityRef {
    pub fn dataset(&self) -> Dataset {
        match self {
            EntityRef::Asset(_) => Dataset::Assets,
            EntityRef::HydrogenPlant(_) => Dataset::HydrogenPlants,
            EntityRef::Renewable(_) => Dataset::Renewables,
            EntityRef::DemandCenter(_) => Dataset::DemandCenters,
            EntityRef::Recommendation(_) => Dataset::Recommendations,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Asset(id) => write!(f, "asset:{id}"),
            EntityRef::HydrogenPlant(id) => write!(f, "h2-plant:{id}"),
            EntityRef::Renewable(id) => write!(f, "renewable:{id}"),
            EntityRef::DemandCenter(id) => write!(f, "demand:{id}"),
            EntityRef::Recommendation(id) => write!(f, "recommendation:{id}"),
        }
    }
}

/// Anything that can be drawn as a single marker.
pub trait Renderable {
    fn entity_ref(&self) -> EntityRef;
    fn category(&self) -> Category;
    fn label(&self) -> &str;
    /// Validated position; `None` when coordinates are absent or malformed.
    fn position(&self) -> Option<LatLng>;

    fn map_point(&self) -> Option<MapPoint> {
        Some(MapPoint {
            entity: self.entity_ref(),
            category: self.category(),
            label: self.label().to_string(),
            position: self.position()?,
        })
    }
}

/// A renderable entity reduced to what the map layer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub entity: EntityRef,
    pub category: Category,
    pub label: String,
    pub position: LatLng,
}

impl Renderable for InfrastructureAsset {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::Asset(self.id.clone())
    }

    fn category(&self) -> Category {
        self.asset_type.into()
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Option<LatLng> {
        InfrastructureAsset::position(self)
    }
}

impl Renderable for HydrogenPlantMarker {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::HydrogenPlant(self.id)
    }

    fn category(&self) -> Category {
        Category::HydrogenPlant
    }

    fn label(&self) -> &str {
        &self.plant_name
    }

    fn position(&self) -> Option<LatLng> {
        HydrogenPlantMarker::position(self)
    }
}

impl Renderable for RenewableMarker {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::Renewable(self.id)
    }

    fn category(&self) -> Category {
        Category::RenewableSource
    }

    fn label(&self) -> &str {
        &self.station
    }

    fn position(&self) -> Option<LatLng> {
        RenewableMarker::position(self)
    }
}

impl Renderable for DemandCenter {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::DemandCenter(self.id.clone())
    }

    fn category(&self) -> Category {
        Category::DemandCenter
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Option<LatLng> {
        DemandCenter::position(self)
    }
}

impl Renderable for Recommendation {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::Recommendation(self.id.clone())
    }

    fn category(&self) -> Category {
        Category::Recommendation
    }

    fn label(&self) -> &str {
        &self.site_name
    }

    fn position(&self) -> Option<LatLng> {
        Recommendation::position(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydromap_schema::AssetStatus;

    #[test]
    fn colliding_ids_across_feeds_are_distinct() {
        let plant = HydrogenPlantMarker::new(7, "Plant", 30.0, -97.0);
        let station = RenewableMarker::new(7, "Station", 30.0, -97.0);
        assert_ne!(plant.entity_ref(), station.entity_ref());
        assert_eq!(plant.entity_ref().dataset(), Dataset::HydrogenPlants);
        assert_eq!(station.entity_ref().dataset(), Dataset::Renewables);
    }

    #[test]
    fn map_point_requires_valid_position() {
        let asset = InfrastructureAsset::new(
            "a-1",
            "Depot",
            AssetType::DistributionHub,
            AssetStatus::Planned,
            "Texas",
        );
        assert!(asset.map_point().is_none());

        let point = asset.with_position(31.0, -99.0).map_point().unwrap();
        assert_eq!(point.category, Category::DistributionHub);
        assert_eq!(point.entity, EntityRef::Asset("a-1".into()));
        assert_eq!(point.label, "Depot");

        let broken = RenewableMarker::new(3, "Broken", "NaN", 10.0);
        assert!(broken.map_point().is_none());
    }
}
