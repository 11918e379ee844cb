//! Session facade over the store and the shared state.
//!
//! Panels never reach into the store or the state directly; they mutate
//! through [`Dashboard`] and render from the [`DashboardView`] snapshot it
//! hands out. Snapshots are cached by revision and rebuilt only after the
//! store, the state or the server analytics moved.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use hydromap_schema::{
    AnalysisRequest, AnalyticsSummary, InfrastructureAsset, LatLng, Recommendation,
};
use tracing::{debug, info, warn};

use crate::analytics::{self, AnalyticsDivergence};
use crate::bounds::{BoundsFitter, MarkerSetId, ViewportUpdate};
use crate::category::{Dataset, EntityRef, MapPoint, Renderable};
use crate::config::{AnalyticsSource, DashboardConfig};
use crate::filter::{self, FilterState};
use crate::layers::{is_visible, Layer, LayerCounts, LayerState};
use crate::proximity::{self, Nearby};
use crate::selection::PredictionRef;
use crate::state::{DashboardState, StateEvent};
use crate::store::{
    EntityRecord, EntityStore, FetchOutcome, FetchStatus, FetchTicket, Fetched, StoreError,
};

/// Assets that pass both the attribute filter and their layer toggle.
pub fn visible_assets<'a>(
    assets: &'a [InfrastructureAsset],
    filter: &'a FilterState,
    layers: LayerState,
) -> impl Iterator<Item = &'a InfrastructureAsset> + 'a {
    filter::filter_assets(assets, filter)
        .filter(move |asset| is_visible(asset.asset_type.into(), &layers))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsOrigin {
    Local,
    Server,
    /// Server-only policy and no summary has arrived yet.
    Pending,
}

/// Read-only snapshot handed to rendering collaborators.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Filtered and visible assets, in store order.
    pub assets: Vec<InfrastructureAsset>,
    /// Every visible entity with a valid position.
    pub points: Vec<MapPoint>,
    /// Recommendations in ranking order.
    pub recommendations: Vec<Recommendation>,
    pub analytics: AnalyticsSummary,
    pub analytics_origin: AnalyticsOrigin,
    pub divergences: Vec<AnalyticsDivergence>,
    pub layer_counts: LayerCounts,
    pub selected: Option<EntityRecord>,
    pub prediction: Option<Recommendation>,
    pub statuses: Vec<(Dataset, FetchStatus)>,
    pub filter: FilterState,
    pub layers: LayerState,
}

impl DashboardView {
    pub fn status(&self, dataset: Dataset) -> FetchStatus {
        self.statuses
            .iter()
            .find(|(candidate, _)| *candidate == dataset)
            .map(|(_, status)| status.clone())
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.statuses.iter().any(|(_, status)| status.is_loading())
    }

    pub fn selected_position(&self) -> Option<LatLng> {
        self.selected.as_ref()?.view().position()
    }

    /// Visible points within `radius_km` of the selected entity, nearest
    /// first. Empty without a positioned selection.
    pub fn nearby_selected(&self, radius_km: f64) -> Vec<Nearby<'_>> {
        let Some(selected) = self.selected.as_ref() else {
            return Vec::new();
        };
        let Some(center) = selected.view().position() else {
            return Vec::new();
        };
        let exclude = selected.view().entity_ref();
        proximity::nearby(&self.points, center, radius_km, Some(&exclude))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ViewKey {
    store: u64,
    state: u64,
    server: u64,
}

pub struct Dashboard {
    config: Arc<DashboardConfig>,
    store: EntityStore,
    state: DashboardState,
    server_analytics: Option<AnalyticsSummary>,
    server_revision: u64,
    fitter: BoundsFitter,
    cached: Option<(ViewKey, Arc<DashboardView>)>,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("store_revision", &self.store.revision())
            .field("state_revision", &self.state.revision())
            .field("server_revision", &self.server_revision)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(config: Arc<DashboardConfig>) -> Self {
        let state = DashboardState::new(config.initial_layers());
        Self {
            config,
            store: EntityStore::new(),
            state,
            server_analytics: None,
            server_revision: 0,
            fitter: BoundsFitter::new(),
            cached: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn subscribe(&mut self) -> Receiver<StateEvent> {
        self.state.subscribe()
    }

    pub fn begin_fetch(&mut self, dataset: Dataset) -> FetchTicket {
        self.store.begin_fetch(dataset)
    }

    pub fn complete_fetch<E: fmt::Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<Fetched, E>,
    ) -> Result<FetchOutcome, StoreError> {
        let outcome = self.store.complete_fetch(ticket, result)?;
        self.after_fetch(ticket.dataset(), &outcome);
        Ok(outcome)
    }

    pub fn load(&mut self, fetched: Fetched) -> FetchOutcome {
        let dataset = fetched.dataset();
        let outcome = self.store.load(fetched);
        self.after_fetch(dataset, &outcome);
        outcome
    }

    fn after_fetch(&mut self, dataset: Dataset, outcome: &FetchOutcome) {
        if !matches!(outcome, FetchOutcome::Applied { .. }) {
            return;
        }
        let stale_entity = self
            .state
            .selected_entity()
            .is_some_and(|entity| entity.dataset() == dataset && !self.store.contains(entity));
        if stale_entity {
            debug!(target: "hydromap::state", %dataset, "selection.pruned");
            self.state.clear_entity();
        }
        if dataset == Dataset::Recommendations {
            let recommendations = self.store.recommendations();
            let stale_prediction = self
                .state
                .selected_prediction()
                .is_some_and(|prediction| recommendations.get(&prediction.0).is_none());
            if stale_prediction {
                debug!(target: "hydromap::state", "prediction.pruned");
                self.state.clear_prediction();
            }
        }
        self.state.dataset_updated(dataset);
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.state.set_filter(filter);
    }

    pub fn update_filter(&mut self, edit: impl FnOnce(&mut FilterState)) {
        self.state.update_filter(edit);
    }

    pub fn toggle_layer(&mut self, layer: Layer) {
        self.state.toggle_layer(layer);
    }

    pub fn set_layer(&mut self, layer: Layer, visible: bool) {
        self.state.set_layer(layer, visible);
    }

    pub fn select_entity(&mut self, entity: EntityRef) {
        self.state.select_entity(entity);
    }

    pub fn clear_entity(&mut self) {
        self.state.clear_entity();
    }

    pub fn select_prediction(&mut self, prediction: PredictionRef) {
        self.state.select_prediction(prediction);
    }

    pub fn clear_prediction(&mut self) {
        self.state.clear_prediction();
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn set_server_analytics(&mut self, summary: AnalyticsSummary) {
        info!(
            target: "hydromap::analytics",
            total_assets = summary.total_assets,
            "analytics.server_received"
        );
        self.server_analytics = Some(summary);
        self.server_revision += 1;
    }

    pub fn server_analytics(&self) -> Option<&AnalyticsSummary> {
        self.server_analytics.as_ref()
    }

    /// Analysis request seeded from the configured defaults.
    pub fn analysis_request(&self) -> AnalysisRequest {
        self.config.analysis
    }

    pub fn min_score(&self) -> f64 {
        self.config.recommendations.min_score
    }

    /// Current snapshot, rebuilt only when something it depends on moved.
    pub fn view(&mut self) -> Arc<DashboardView> {
        let key = ViewKey {
            store: self.store.revision(),
            state: self.state.revision(),
            server: self.server_revision,
        };
        if let Some((cached_key, view)) = &self.cached {
            if *cached_key == key {
                return Arc::clone(view);
            }
        }
        let view = Arc::new(self.build_view());
        self.cached = Some((key, Arc::clone(&view)));
        view
    }

    /// Envelope over the visible points, recomputed only when the set of
    /// visible markers may have changed.
    pub fn fit_viewport(&mut self) -> ViewportUpdate {
        let id = MarkerSetId {
            data_revision: self.store.data_revision(),
            visibility_revision: self.state.visibility_revision(),
        };
        let positions: Vec<LatLng> = self
            .visible_points()
            .into_iter()
            .map(|point| point.position)
            .collect();
        self.fitter.refit(id, positions)
    }

    fn visible_points(&self) -> Vec<MapPoint> {
        let layers = self.state.layers();
        let assets = visible_assets(self.store.assets().records(), self.state.filter(), layers)
            .filter_map(Renderable::map_point);
        let markers = self
            .store
            .marker_points()
            .filter(|point| is_visible(point.category, &layers));
        assets.chain(markers).collect()
    }

    fn build_view(&self) -> DashboardView {
        let filter = self.state.filter();
        let layers = self.state.layers();
        let assets: Vec<InfrastructureAsset> =
            visible_assets(self.store.assets().records(), filter, layers)
                .cloned()
                .collect();
        let local = analytics::summarize(&assets);
        let (analytics, analytics_origin, divergences) =
            self.resolve_analytics(local, filter, layers);

        let selected = self
            .state
            .selected_entity()
            .and_then(|entity| self.store.get(entity))
            .map(EntityRecord::from);
        let prediction = self
            .state
            .selected_prediction()
            .and_then(|prediction| self.store.recommendations().get(&prediction.0))
            .cloned();

        DashboardView {
            points: self.visible_points(),
            assets,
            recommendations: self.store.recommendations().records().to_vec(),
            analytics,
            analytics_origin,
            divergences,
            layer_counts: self.store.layer_counts(),
            selected,
            prediction,
            statuses: Dataset::ALL
                .into_iter()
                .map(|dataset| (dataset, self.store.status(dataset).clone()))
                .collect(),
            filter: filter.clone(),
            layers,
        }
    }

    fn resolve_analytics(
        &self,
        local: AnalyticsSummary,
        filter: &FilterState,
        layers: LayerState,
    ) -> (AnalyticsSummary, AnalyticsOrigin, Vec<AnalyticsDivergence>) {
        let settings = &self.config.analytics;
        // The server aggregates every asset, so the two only describe the
        // same set when nothing is filtered out or hidden.
        let comparable = filter.is_unrestricted() && layers == LayerState::all();
        let divergences = match (&self.server_analytics, comparable) {
            (Some(server), true) => {
                analytics::compare(&local, server, settings.divergence_tolerance)
            }
            _ => Vec::new(),
        };
        for divergence in &divergences {
            warn!(
                target: "hydromap::analytics",
                metric = divergence.metric,
                local = divergence.local,
                server = divergence.server,
                "analytics.divergence"
            );
        }

        let (summary, origin) = match (settings.source, &self.server_analytics) {
            (AnalyticsSource::Local, _) => (local, AnalyticsOrigin::Local),
            (AnalyticsSource::Server, Some(server)) => (server.clone(), AnalyticsOrigin::Server),
            (AnalyticsSource::Server, None) => {
                (AnalyticsSummary::default(), AnalyticsOrigin::Pending)
            }
            (AnalyticsSource::ServerWithLocalFallback, Some(server)) if comparable => {
                (server.clone(), AnalyticsOrigin::Server)
            }
            (AnalyticsSource::ServerWithLocalFallback, _) => (local, AnalyticsOrigin::Local),
        };
        (summary, origin, divergences)
    }
}
