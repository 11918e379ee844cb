use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coordinates::{Coordinate, LatLng, RawLatLng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetType {
    HydrogenPlant,
    StorageFacility,
    Pipeline,
    DistributionHub,
}

impl AssetType {
    pub const ALL: [AssetType; 4] = [
        AssetType::HydrogenPlant,
        AssetType::StorageFacility,
        AssetType::Pipeline,
        AssetType::DistributionHub,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::HydrogenPlant => "hydrogen-plant",
            AssetType::StorageFacility => "storage-facility",
            AssetType::Pipeline => "pipeline",
            AssetType::DistributionHub => "distribution-hub",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetType::HydrogenPlant => "Hydrogen Production Plant",
            AssetType::StorageFacility => "Storage Facility",
            AssetType::Pipeline => "Pipeline",
            AssetType::DistributionHub => "Distribution Hub",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetStatus {
    Operational,
    UnderConstruction,
    Planned,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 3] = [
        AssetStatus::Operational,
        AssetStatus::UnderConstruction,
        AssetStatus::Planned,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetStatus::Operational => "operational",
            AssetStatus::UnderConstruction => "under-construction",
            AssetStatus::Planned => "planned",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary infrastructure record served by `/api/infrastructure/assets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureAsset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub status: AssetStatus,
    pub region: String,
    #[serde(default)]
    pub coordinates: Option<RawLatLng>,
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub capacity_unit: Option<String>,
    #[serde(default)]
    pub efficiency: Option<f64>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

impl InfrastructureAsset {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        asset_type: AssetType,
        status: AssetStatus,
        region: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            asset_type,
            status,
            region: region.into(),
            coordinates: None,
            capacity: None,
            capacity_unit: None,
            efficiency: None,
            owner: None,
            year_built: None,
            estimated_cost: None,
        }
    }

    pub fn with_position(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(RawLatLng::new(lat, lng));
        self
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency = Some(efficiency);
        self
    }

    pub fn with_estimated_cost(mut self, cost: f64) -> Self {
        self.estimated_cost = Some(cost);
        self
    }

    pub fn with_year_built(mut self, year: i32) -> Self {
        self.year_built = Some(year);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn position(&self) -> Option<LatLng> {
        self.coordinates.as_ref().and_then(RawLatLng::resolve)
    }

    /// Capacity with its unit, falling back to MW when the feed omits one.
    pub fn capacity_display(&self) -> Option<String> {
        self.capacity.map(|capacity| {
            format!(
                "{} {}",
                capacity,
                self.capacity_unit.as_deref().unwrap_or("MW")
            )
        })
    }
}

/// Existing hydrogen plant from the `/api/existingH2Plants` feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrogenPlantMarker {
    pub id: u64,
    #[serde(rename = "Plant_Name", default)]
    pub plant_name: String,
    #[serde(rename = "Latitude", default)]
    pub latitude: Coordinate,
    #[serde(rename = "Longitude", default)]
    pub longitude: Coordinate,
}

impl HydrogenPlantMarker {
    pub fn new(
        id: u64,
        plant_name: impl Into<String>,
        latitude: impl Into<Coordinate>,
        longitude: impl Into<Coordinate>,
    ) -> Self {
        Self {
            id,
            plant_name: plant_name.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    pub fn position(&self) -> Option<LatLng> {
        LatLng::checked(self.latitude.degrees()?, self.longitude.degrees()?)
    }
}

/// Renewable power station from the `/api/renewables` feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewableMarker {
    pub id: u64,
    #[serde(rename = "Station", default)]
    pub station: String,
    #[serde(rename = "Latitude", default)]
    pub latitude: Coordinate,
    #[serde(rename = "Longitude", default)]
    pub longitude: Coordinate,
}

impl RenewableMarker {
    pub fn new(
        id: u64,
        station: impl Into<String>,
        latitude: impl Into<Coordinate>,
        longitude: impl Into<Coordinate>,
    ) -> Self {
        Self {
            id,
            station: station.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    pub fn position(&self) -> Option<LatLng> {
        LatLng::checked(self.latitude.degrees()?, self.longitude.degrees()?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandCenter {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub center_type: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub coordinates: Option<RawLatLng>,
    /// Tons per year.
    #[serde(default)]
    pub estimated_demand: f64,
}

impl DemandCenter {
    pub fn position(&self) -> Option<LatLng> {
        self.coordinates.as_ref().and_then(RawLatLng::resolve)
    }
}

/// Candidate site ranked by the external analysis service. Opaque to the
/// dashboard beyond display and selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub site_name: String,
    #[serde(default)]
    pub coordinates: Option<RawLatLng>,
    pub match_score: f64,
    #[serde(default)]
    pub proximity_score: Option<f64>,
    #[serde(default)]
    pub demand_score: Option<f64>,
    #[serde(default)]
    pub regulatory_score: Option<f64>,
    #[serde(default)]
    pub cost_score: Option<f64>,
    /// Millions of USD.
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl Recommendation {
    pub fn position(&self) -> Option<LatLng> {
        self.coordinates.as_ref().and_then(RawLatLng::resolve)
    }

    pub fn match_tier(&self) -> MatchTier {
        MatchTier::from_score(self.match_score)
    }
}

/// Display bucket for a recommendation's match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Top,
    Strong,
    Candidate,
}

impl MatchTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 95.0 {
            MatchTier::Top
        } else if score >= 85.0 {
            MatchTier::Strong
        } else {
            MatchTier::Candidate
        }
    }
}
