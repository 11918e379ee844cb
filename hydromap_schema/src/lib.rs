//! Wire data model for the hydrogen infrastructure dashboard.
//!
//! Records mirror the JSON served by the infrastructure API and the marker
//! feeds. Infrastructure assets, demand centers and recommendations use the
//! API's camelCase field names; the marker feeds keep their upstream column
//! names (`Latitude`, `Plant_Name`, `Station`).

mod analysis;
mod analytics;
mod coordinates;
mod records;

pub use analysis::{AnalysisCriteria, AnalysisRequest, CriteriaError, WEIGHT_SUM_TOLERANCE};
pub use analytics::{AnalyticsSummary, CapacityPoint, RegionShare, TypeShare};
pub use coordinates::{Coordinate, LatLng, RawLatLng};
pub use records::{
    AssetStatus, AssetType, DemandCenter, HydrogenPlantMarker, InfrastructureAsset, MatchTier,
    Recommendation, RenewableMarker,
};
