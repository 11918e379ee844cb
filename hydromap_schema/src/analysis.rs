use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed drift of the weight sum away from 1.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// Relative weights the ranking service applies when scoring candidate sites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisCriteria {
    pub proximity_weight: f64,
    pub demand_weight: f64,
    pub regulatory_weight: f64,
    pub cost_weight: f64,
}

impl Default for AnalysisCriteria {
    fn default() -> Self {
        Self {
            proximity_weight: 0.3,
            demand_weight: 0.25,
            regulatory_weight: 0.2,
            cost_weight: 0.25,
        }
    }
}

impl AnalysisCriteria {
    fn named_weights(&self) -> [(&'static str, f64); 4] {
        [
            ("proximityWeight", self.proximity_weight),
            ("demandWeight", self.demand_weight),
            ("regulatoryWeight", self.regulatory_weight),
            ("costWeight", self.cost_weight),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.named_weights().iter().map(|(_, weight)| weight).sum()
    }
}

/// Body of `POST /api/ml/analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub criteria: AnalysisCriteria,
    pub max_results: u32,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            criteria: AnalysisCriteria::default(),
            max_results: 10,
        }
    }
}

impl AnalysisRequest {
    pub fn validate(&self) -> Result<(), CriteriaError> {
        for (name, weight) in self.criteria.named_weights() {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(CriteriaError::WeightOutOfRange {
                    name,
                    value: weight,
                });
            }
        }
        let sum = self.criteria.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CriteriaError::NotNormalized { sum });
        }
        if self.max_results == 0 {
            return Err(CriteriaError::NoResultsRequested);
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CriteriaError {
    #[error("{name} must be within [0, 1], got {value}")]
    WeightOutOfRange { name: &'static str, value: f64 },
    #[error("criteria weights must sum to 1, got {sum:.4}")]
    NotNormalized { sum: f64 },
    #[error("maxResults must be at least 1")]
    NoResultsRequested,
}
