use serde::{Deserialize, Serialize};

use crate::records::AssetType;

/// Aggregate view over a set of infrastructure assets.
///
/// Same shape whether it was computed locally or polled from `/api/analytics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSummary {
    pub total_assets: usize,
    pub total_capacity: f64,
    pub active_projects: usize,
    pub average_efficiency: f64,
    pub total_investment: f64,
    pub type_distribution: Vec<TypeShare>,
    pub region_distribution: Vec<RegionShare>,
    pub capacity_trend: Vec<CapacityPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionShare {
    pub region: String,
    pub count: usize,
    pub capacity: f64,
}

impl RegionShare {
    /// Bar length for this region relative to the busiest one, in percent.
    pub fn relative_to(&self, max_count: usize) -> f64 {
        if max_count == 0 {
            0.0
        } else {
            100.0 * self.count as f64 / max_count as f64
        }
    }
}

/// Cumulative capacity online by the end of `year`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPoint {
    pub year: i32,
    pub capacity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_payload_without_optional_sections_parses() {
        let json = r#"{
            "totalCapacity": 2400,
            "activeProjects": 12,
            "averageEfficiency": 71.5,
            "totalInvestment": 930,
            "typeDistribution": [{"type": "pipeline", "count": 3, "percentage": 100}],
            "regionDistribution": [{"region": "Texas", "count": 3, "capacity": 0}]
        }"#;
        let summary: AnalyticsSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.active_projects, 12);
        assert_eq!(summary.type_distribution[0].asset_type, AssetType::Pipeline);
        assert!(summary.capacity_trend.is_empty());
        assert_eq!(summary.total_assets, 0);
    }

    #[test]
    fn relative_bar_handles_empty_max() {
        let share = RegionShare {
            region: "Texas".into(),
            count: 2,
            capacity: 0.0,
        };
        assert_eq!(share.relative_to(0), 0.0);
        assert_eq!(share.relative_to(4), 50.0);
    }
}
