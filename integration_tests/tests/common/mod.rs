#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Once};

use anyhow::Context;
use hydromap_core::{load_dashboard_config_from_env, Dashboard, DashboardConfig, Fetched};
use serde::de::DeserializeOwned;

static INIT: Once = Once::new();

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = fixture_path("test_dashboard_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test dashboard config at {}",
            config_path.display()
        );

        std::env::set_var("HYDROMAP_CONFIG_PATH", &config_path);
    });
}

pub fn fixture<T: DeserializeOwned>(name: &str) -> anyhow::Result<T> {
    let path = fixture_path(name);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading fixture {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing fixture {}", path.display()))
}

pub fn fetched_assets() -> anyhow::Result<Fetched> {
    Ok(Fetched::Assets(fixture("assets.json")?))
}

pub fn fetched_hydrogen_plants() -> anyhow::Result<Fetched> {
    Ok(Fetched::HydrogenPlants(fixture("hydrogen_plants.json")?))
}

pub fn fetched_renewables() -> anyhow::Result<Fetched> {
    Ok(Fetched::Renewables(fixture("renewables.json")?))
}

pub fn fetched_demand_centers() -> anyhow::Result<Fetched> {
    Ok(Fetched::DemandCenters(fixture("demand_centers.json")?))
}

pub fn fetched_recommendations() -> anyhow::Result<Fetched> {
    Ok(Fetched::Recommendations(fixture("recommendations.json")?))
}

pub fn test_config() -> Arc<DashboardConfig> {
    ensure_test_config();
    let (config, _metadata) = load_dashboard_config_from_env();
    config
}

/// Dashboard on the test config with every fixture dataset loaded.
pub fn loaded_dashboard() -> anyhow::Result<Dashboard> {
    load_all(Dashboard::new(test_config()))
}

pub fn load_all(mut dashboard: Dashboard) -> anyhow::Result<Dashboard> {
    for fetched in [
        fetched_assets()?,
        fetched_hydrogen_plants()?,
        fetched_renewables()?,
        fetched_demand_centers()?,
        fetched_recommendations()?,
    ] {
        dashboard.load(fetched);
    }
    Ok(dashboard)
}
