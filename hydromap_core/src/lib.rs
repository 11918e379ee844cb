//! Reconciliation and state core of the hydrogen infrastructure dashboard.
//!
//! Fetched records land in the [`EntityStore`]; the shared filter, layer and
//! selection state lives in [`DashboardState`]. [`Dashboard`] ties the two
//! together and derives the read-only [`DashboardView`] every panel renders
//! from. Nothing here performs I/O beyond reading the config file; network
//! results are handed in through fetch tickets.

pub mod analytics;
pub mod bounds;
mod category;
pub mod config;
mod dashboard;
pub mod filter;
mod layers;
pub mod proximity;
mod selection;
mod state;
mod store;

pub use analytics::{summarize, AnalyticsDivergence};
pub use bounds::{fit_bounds, BoundsFitter, GeoBounds, MarkerSetId, ViewportUpdate};
pub use category::{Category, Dataset, EntityRef, MapPoint, Renderable};
pub use config::{
    load_dashboard_config, load_dashboard_config_from_env, AnalyticsSource, DashboardConfig,
    DashboardConfigError, DashboardConfigMetadata,
};
pub use dashboard::{visible_assets, AnalyticsOrigin, Dashboard, DashboardView};
pub use filter::{matches, CapacityRange, FilterState};
pub use layers::{is_visible, Layer, LayerCounts, LayerDefaults, LayerState};
pub use proximity::{haversine_km, nearby, Nearby};
pub use selection::{PredictionRef, Selection, Slot};
pub use state::{DashboardState, StateEvent};
pub use store::{
    Collection, EntityRecord, EntityStore, EntityView, FetchOutcome, FetchStatus, FetchTicket,
    Fetched, Record, StoreError,
};

pub use hydromap_schema as schema;
