//! Dashboard configuration.
//!
//! Loaded from `dashboard_config.json`, overridable through
//! `HYDROMAP_CONFIG_PATH`.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use hydromap_schema::AnalysisRequest;
use serde::Deserialize;
use thiserror::Error;

use crate::layers::{LayerDefaults, LayerState};

pub const BUILTIN_DASHBOARD_CONFIG: &str = include_str!("data/dashboard_config.json");
pub const CONFIG_PATH_ENV: &str = "HYDROMAP_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub analytics: AnalyticsConfig,
    pub recommendations: RecommendationConfig,
    pub analysis: AnalysisRequest,
    pub layers: LayerDefaults,
    pub regions: Vec<String>,
    pub proximity_radius_km: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            analytics: AnalyticsConfig::default(),
            recommendations: RecommendationConfig::default(),
            analysis: AnalysisRequest::default(),
            layers: LayerDefaults::default(),
            regions: ["California", "Texas", "New York", "Florida"]
                .into_iter()
                .map(String::from)
                .collect(),
            proximity_radius_km: 150.0,
        }
    }
}

impl DashboardConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_DASHBOARD_CONFIG)
                .expect("builtin dashboard config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, DashboardConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| DashboardConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = DashboardConfig::from_json_str(&contents)?;
        Ok(config)
    }

    pub fn initial_layers(&self) -> LayerState {
        self.layers.into()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub endpoints: EndpointConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_ms: 10_000,
            endpoints: EndpointConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub assets: String,
    pub hydrogen_plants: String,
    pub renewables: String,
    pub demand_centers: String,
    pub recommendations: String,
    pub analyze: String,
    pub analytics: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            assets: "/api/infrastructure/assets".to_string(),
            hydrogen_plants: "/api/existingH2Plants".to_string(),
            renewables: "/api/renewables".to_string(),
            demand_centers: "/api/demand-centers".to_string(),
            recommendations: "/api/ml/recommendations".to_string(),
            analyze: "/api/ml/analyze".to_string(),
            analytics: "/api/analytics".to_string(),
        }
    }
}

/// Where the analytics panel takes its numbers from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsSource {
    /// Always aggregate the filtered and visible assets locally.
    Local,
    /// Show the last polled server summary, empty until one arrives.
    Server,
    #[default]
    ServerWithLocalFallback,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub source: AnalyticsSource,
    pub poll_interval_secs: u64,
    /// Relative drift between local and server KPIs tolerated before a
    /// divergence is reported.
    pub divergence_tolerance: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            source: AnalyticsSource::default(),
            poll_interval_secs: 30,
            divergence_tolerance: 0.01,
        }
    }
}

impl AnalyticsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub min_score: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self { min_score: 80.0 }
    }
}

#[derive(Debug, Error)]
pub enum DashboardConfigError {
    #[error("failed to parse dashboard config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read dashboard config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the active configuration came from.
#[derive(Debug, Clone, Default)]
pub struct DashboardConfigMetadata {
    path: Option<PathBuf>,
}

impl DashboardConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load the dashboard configuration from `path`, falling back to the builtin
/// asset when the file is missing or malformed.
pub fn load_dashboard_config(
    path: Option<PathBuf>,
) -> (Arc<DashboardConfig>, DashboardConfigMetadata) {
    if let Some(path) = path {
        match DashboardConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "hydromap::config",
                    path = %path.display(),
                    "dashboard_config.loaded=file"
                );
                return (Arc::new(config), DashboardConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "hydromap::config",
                    path = %path.display(),
                    error = %err,
                    "dashboard_config.load_failed"
                );
            }
        }
    }

    let config = DashboardConfig::builtin();
    tracing::info!(target: "hydromap::config", "dashboard_config.loaded=builtin");
    (config, DashboardConfigMetadata::new(None))
}

pub fn load_dashboard_config_from_env() -> (Arc<DashboardConfig>, DashboardConfigMetadata) {
    load_dashboard_config(env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
}
