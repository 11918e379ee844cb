//! Per-dataset caches of fetched records.
//!
//! Fetches are asynchronous and may overlap, so every fetch is bracketed by a
//! [`FetchTicket`]: [`EntityStore::begin_fetch`] issues one carrying the next
//! generation for its dataset, and [`EntityStore::complete_fetch`] applies a
//! result only when its ticket is still the newest issued. A slow response
//! that lands after a newer request was made is dropped.
//!
//! A successful fetch replaces the dataset's records wholesale. A failed fetch
//! marks that dataset `Failed` and leaves every cache untouched.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use hydromap_schema::{
    DemandCenter, HydrogenPlantMarker, InfrastructureAsset, LatLng, Recommendation, RenewableMarker,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::category::{Category, Dataset, EntityRef, MapPoint, Renderable};
use crate::layers::{Layer, LayerCounts};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }
}

/// Proof that a fetch was requested; hand it back with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    dataset: Dataset,
    generation: u64,
}

impl FetchTicket {
    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A decoded payload for one dataset.
#[derive(Debug, Clone)]
pub enum Fetched {
    Assets(Vec<InfrastructureAsset>),
    HydrogenPlants(Vec<HydrogenPlantMarker>),
    Renewables(Vec<RenewableMarker>),
    DemandCenters(Vec<DemandCenter>),
    Recommendations(Vec<Recommendation>),
}

impl Fetched {
    pub fn dataset(&self) -> Dataset {
        match self {
            Fetched::Assets(_) => Dataset::Assets,
            Fetched::HydrogenPlants(_) => Dataset::HydrogenPlants,
            Fetched::Renewables(_) => Dataset::Renewables,
            Fetched::DemandCenters(_) => Dataset::DemandCenters,
            Fetched::Recommendations(_) => Dataset::Recommendations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { records: usize },
    Failed,
    /// A newer fetch for the same dataset was issued after this ticket.
    Stale,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("fetch ticket for {expected} completed with a {actual} payload")]
    DatasetMismatch { expected: Dataset, actual: Dataset },
}

/// A record type with a stable identifier inside its dataset.
pub trait Record: Clone {
    type Id: Clone + Eq + Hash + fmt::Debug;

    fn record_id(&self) -> Self::Id;
}

impl Record for InfrastructureAsset {
    type Id = String;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

impl Record for HydrogenPlantMarker {
    type Id = u64;

    fn record_id(&self) -> u64 {
        self.id
    }
}

impl Record for RenewableMarker {
    type Id = u64;

    fn record_id(&self) -> u64 {
        self.id
    }
}

impl Record for DemandCenter {
    type Id = String;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

impl Record for Recommendation {
    type Id = String;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

/// Ordered records of one dataset plus an id index.
#[derive(Debug, Clone)]
pub struct Collection<T: Record> {
    records: Vec<T>,
    index: HashMap<T::Id, usize>,
    status: FetchStatus,
    issued: u64,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            status: FetchStatus::Idle,
            issued: 0,
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.index.get(id).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// Replace every record; the first occurrence of a duplicated id wins.
    fn replace(&mut self, dataset: Dataset, incoming: Vec<T>) -> usize {
        let mut records = Vec::with_capacity(incoming.len());
        let mut index = HashMap::with_capacity(incoming.len());
        for record in incoming {
            let id = record.record_id();
            if index.contains_key(&id) {
                warn!(
                    target: "hydromap::store",
                    %dataset,
                    id = ?id,
                    "fetch.duplicate_id_dropped"
                );
                continue;
            }
            index.insert(id, records.len());
            records.push(record);
        }
        self.records = records;
        self.index = index;
        self.records.len()
    }
}

/// Read-only reference to any cached entity.
#[derive(Debug, Clone, Copy)]
pub enum EntityView<'a> {
    Asset(&'a InfrastructureAsset),
    HydrogenPlant(&'a HydrogenPlantMarker),
    Renewable(&'a RenewableMarker),
    DemandCenter(&'a DemandCenter),
    Recommendation(&'a Recommendation),
}

impl EntityView<'_> {
    fn as_renderable(&self) -> &dyn Renderable {
        match self {
            EntityView::Asset(record) => *record,
            EntityView::HydrogenPlant(record) => *record,
            EntityView::Renewable(record) => *record,
            EntityView::DemandCenter(record) => *record,
            EntityView::Recommendation(record) => *record,
        }
    }
}

impl Renderable for EntityView<'_> {
    fn entity_ref(&self) -> EntityRef {
        self.as_renderable().entity_ref()
    }

    fn category(&self) -> Category {
        self.as_renderable().category()
    }

    fn label(&self) -> &str {
        self.as_renderable().label()
    }

    fn position(&self) -> Option<LatLng> {
        self.as_renderable().position()
    }
}

/// Owned copy of an entity, detached from the store for snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRecord {
    Asset(InfrastructureAsset),
    HydrogenPlant(HydrogenPlantMarker),
    Renewable(RenewableMarker),
    DemandCenter(DemandCenter),
    Recommendation(Recommendation),
}

impl EntityRecord {
    pub fn view(&self) -> EntityView<'_> {
        match self {
            EntityRecord::Asset(record) => EntityView::Asset(record),
            EntityRecord::HydrogenPlant(record) => EntityView::HydrogenPlant(record),
            EntityRecord::Renewable(record) => EntityView::Renewable(record),
            EntityRecord::DemandCenter(record) => EntityView::DemandCenter(record),
            EntityRecord::Recommendation(record) => EntityView::Recommendation(record),
        }
    }
}

impl From<EntityView<'_>> for EntityRecord {
    fn from(view: EntityView<'_>) -> Self {
        match view {
            EntityView::Asset(record) => EntityRecord::Asset(record.clone()),
            EntityView::HydrogenPlant(record) => EntityRecord::HydrogenPlant(record.clone()),
            EntityView::Renewable(record) => EntityRecord::Renewable(record.clone()),
            EntityView::DemandCenter(record) => EntityRecord::DemandCenter(record.clone()),
            EntityView::Recommendation(record) => EntityRecord::Recommendation(record.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    assets: Collection<InfrastructureAsset>,
    hydrogen_plants: Collection<HydrogenPlantMarker>,
    renewables: Collection<RenewableMarker>,
    demand_centers: Collection<DemandCenter>,
    recommendations: Collection<Recommendation>,
    revision: u64,
    data_revision: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every observable change, fetch status included.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bumped only when a dataset's records are replaced.
    pub fn data_revision(&self) -> u64 {
        self.data_revision
    }

    pub fn assets(&self) -> &Collection<InfrastructureAsset> {
        &self.assets
    }

    pub fn hydrogen_plants(&self) -> &Collection<HydrogenPlantMarker> {
        &self.hydrogen_plants
    }

    pub fn renewables(&self) -> &Collection<RenewableMarker> {
        &self.renewables
    }

    pub fn demand_centers(&self) -> &Collection<DemandCenter> {
        &self.demand_centers
    }

    pub fn recommendations(&self) -> &Collection<Recommendation> {
        &self.recommendations
    }

    pub fn status(&self, dataset: Dataset) -> &FetchStatus {
        match dataset {
            Dataset::Assets => self.assets.status(),
            Dataset::HydrogenPlants => self.hydrogen_plants.status(),
            Dataset::Renewables => self.renewables.status(),
            Dataset::DemandCenters => self.demand_centers.status(),
            Dataset::Recommendations => self.recommendations.status(),
        }
    }

    fn bookkeeping_mut(&mut self, dataset: Dataset) -> (&mut FetchStatus, &mut u64) {
        match dataset {
            Dataset::Assets => (&mut self.assets.status, &mut self.assets.issued),
            Dataset::HydrogenPlants => (
                &mut self.hydrogen_plants.status,
                &mut self.hydrogen_plants.issued,
            ),
            Dataset::Renewables => (&mut self.renewables.status, &mut self.renewables.issued),
            Dataset::DemandCenters => (
                &mut self.demand_centers.status,
                &mut self.demand_centers.issued,
            ),
            Dataset::Recommendations => (
                &mut self.recommendations.status,
                &mut self.recommendations.issued,
            ),
        }
    }

    /// Mark `dataset` as loading and issue the ticket for the new request.
    pub fn begin_fetch(&mut self, dataset: Dataset) -> FetchTicket {
        let (status, issued) = self.bookkeeping_mut(dataset);
        *issued += 1;
        *status = FetchStatus::Loading;
        let ticket = FetchTicket {
            dataset,
            generation: *issued,
        };
        self.revision += 1;
        debug!(
            target: "hydromap::store",
            %dataset,
            generation = ticket.generation,
            "fetch.issued"
        );
        ticket
    }

    pub fn complete_fetch<E: fmt::Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<Fetched, E>,
    ) -> Result<FetchOutcome, StoreError> {
        let dataset = ticket.dataset;
        let (status, issued) = self.bookkeeping_mut(dataset);
        if ticket.generation != *issued {
            debug!(
                target: "hydromap::store",
                %dataset,
                generation = ticket.generation,
                latest = *issued,
                "fetch.stale_ignored"
            );
            return Ok(FetchOutcome::Stale);
        }

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(err) => {
                let message = err.to_string();
                warn!(
                    target: "hydromap::store",
                    %dataset,
                    error = %message,
                    "fetch.failed"
                );
                *status = FetchStatus::Failed(message);
                self.revision += 1;
                return Ok(FetchOutcome::Failed);
            }
        };

        if fetched.dataset() != dataset {
            let err = StoreError::DatasetMismatch {
                expected: dataset,
                actual: fetched.dataset(),
            };
            warn!(target: "hydromap::store", %dataset, error = %err, "fetch.mismatched");
            *status = FetchStatus::Failed(err.to_string());
            self.revision += 1;
            return Err(err);
        }

        let records = match fetched {
            Fetched::Assets(records) => self.assets.replace(dataset, records),
            Fetched::HydrogenPlants(records) => self.hydrogen_plants.replace(dataset, records),
            Fetched::Renewables(records) => self.renewables.replace(dataset, records),
            Fetched::DemandCenters(records) => self.demand_centers.replace(dataset, records),
            Fetched::Recommendations(records) => self.recommendations.replace(dataset, records),
        };
        let (status, _) = self.bookkeeping_mut(dataset);
        *status = FetchStatus::Ready;
        self.revision += 1;
        self.data_revision += 1;
        info!(
            target: "hydromap::store",
            %dataset,
            records,
            generation = ticket.generation,
            "fetch.applied"
        );
        Ok(FetchOutcome::Applied { records })
    }

    /// Issue a ticket and apply `fetched` right away. For callers that already
    /// hold the payload, such as fixtures and tests.
    pub fn load(&mut self, fetched: Fetched) -> FetchOutcome {
        let ticket = self.begin_fetch(fetched.dataset());
        match self.complete_fetch::<String>(ticket, Ok(fetched)) {
            Ok(outcome) => outcome,
            // The ticket was issued for this payload's own dataset.
            Err(_) => FetchOutcome::Failed,
        }
    }

    pub fn get(&self, entity: &EntityRef) -> Option<EntityView<'_>> {
        match entity {
            EntityRef::Asset(id) => self.assets.get(id).map(EntityView::Asset),
            EntityRef::HydrogenPlant(id) => {
                self.hydrogen_plants.get(id).map(EntityView::HydrogenPlant)
            }
            EntityRef::Renewable(id) => self.renewables.get(id).map(EntityView::Renewable),
            EntityRef::DemandCenter(id) => {
                self.demand_centers.get(id).map(EntityView::DemandCenter)
            }
            EntityRef::Recommendation(id) => {
                self.recommendations.get(id).map(EntityView::Recommendation)
            }
        }
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.get(entity).is_some()
    }

    /// Valid map points of the secondary feeds (everything except assets).
    pub fn marker_points(&self) -> impl Iterator<Item = MapPoint> + '_ {
        let plants = self
            .hydrogen_plants
            .records()
            .iter()
            .filter_map(Renderable::map_point);
        let renewables = self
            .renewables
            .records()
            .iter()
            .filter_map(Renderable::map_point);
        let demand = self
            .demand_centers
            .records()
            .iter()
            .filter_map(Renderable::map_point);
        let recommendations = self
            .recommendations
            .records()
            .iter()
            .filter_map(Renderable::map_point);
        plants.chain(renewables).chain(demand).chain(recommendations)
    }

    pub fn layer_counts(&self) -> LayerCounts {
        let mut counts = LayerCounts::default();
        for asset in self.assets.records() {
            if let Some(layer) = Layer::for_category(asset.asset_type.into()) {
                counts.add(layer, 1);
            }
        }
        counts.add(Layer::HydrogenPlant, self.hydrogen_plants.len());
        counts.add(Layer::RenewableSources, self.renewables.len());
        counts.add(Layer::DemandCenters, self.demand_centers.len());
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydromap_schema::{AssetStatus, AssetType};

    fn asset(id: &str) -> InfrastructureAsset {
        InfrastructureAsset::new(
            id,
            format!("Asset {id}"),
            AssetType::HydrogenPlant,
            AssetStatus::Operational,
            "Texas",
        )
    }

    #[test]
    fn refetch_replaces_instead_of_merging() {
        let mut store = EntityStore::new();
        store.load(Fetched::Assets(vec![asset("a"), asset("b")]));
        store.load(Fetched::Assets(vec![asset("b")]));
        assert_eq!(store.assets().len(), 1);
        assert!(store.get(&EntityRef::Asset("a".into())).is_none());
        assert!(store.get(&EntityRef::Asset("b".into())).is_some());
    }

    #[test]
    fn older_ticket_resolving_late_is_ignored() {
        let mut store = EntityStore::new();
        let first = store.begin_fetch(Dataset::Assets);
        let second = store.begin_fetch(Dataset::Assets);

        let newer = store
            .complete_fetch::<String>(second, Ok(Fetched::Assets(vec![asset("new")])))
            .unwrap();
        assert_eq!(newer, FetchOutcome::Applied { records: 1 });

        let older = store
            .complete_fetch::<String>(first, Ok(Fetched::Assets(vec![asset("old")])))
            .unwrap();
        assert_eq!(older, FetchOutcome::Stale);
        assert_eq!(store.assets().records()[0].id, "new");
        assert_eq!(store.status(Dataset::Assets), &FetchStatus::Ready);
    }

    #[test]
    fn mismatched_payload_fails_the_dataset() {
        let mut store = EntityStore::new();
        let ticket = store.begin_fetch(Dataset::DemandCenters);
        let before = store.revision();
        let err = store
            .complete_fetch::<String>(ticket, Ok(Fetched::Assets(Vec::new())))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DatasetMismatch {
                expected: Dataset::DemandCenters,
                actual: Dataset::Assets,
            }
        );
        assert_eq!(
            store.status(Dataset::DemandCenters),
            &FetchStatus::Failed(err.to_string())
        );
        assert!(store.revision() > before);
        assert_eq!(store.status(Dataset::Assets), &FetchStatus::Idle);
    }

    #[test]
    fn failure_is_scoped_to_its_dataset() {
        let mut store = EntityStore::new();
        store.load(Fetched::Assets(vec![asset("a")]));
        store.load(Fetched::Renewables(vec![RenewableMarker::new(
            1, "Mesa", 33.0, -111.0,
        )]));

        let ticket = store.begin_fetch(Dataset::Renewables);
        assert!(store.status(Dataset::Renewables).is_loading());
        let outcome = store
            .complete_fetch(ticket, Err("502 Bad Gateway"))
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(
            store.status(Dataset::Renewables),
            &FetchStatus::Failed("502 Bad Gateway".into())
        );
        assert_eq!(store.status(Dataset::Assets), &FetchStatus::Ready);
        assert_eq!(store.assets().len(), 1);
        assert_eq!(store.renewables().len(), 1);
    }

    #[test]
    fn mismatched_payload_is_an_error() {
        let mut store = EntityStore::new();
        let ticket = store.begin_fetch(Dataset::DemandCenters);
        let err = store
            .complete_fetch::<String>(ticket, Ok(Fetched::Assets(Vec::new())))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DatasetMismatch {
                expected: Dataset::DemandCenters,
                actual: Dataset::Assets,
            }
        );
    }

    #[test]
    fn duplicate_ids_keep_first_record() {
        let mut store = EntityStore::new();
        let mut second = asset("a");
        second.name = "Shadow".into();
        store.load(Fetched::Assets(vec![asset("a"), second, asset("b")]));
        assert_eq!(store.assets().len(), 2);
        let Some(EntityView::Asset(found)) = store.get(&EntityRef::Asset("a".into())) else {
            panic!("asset a missing");
        };
        assert_eq!(found.name, "Asset a");
    }

    #[test]
    fn same_numeric_id_in_two_feeds_stays_separate() {
        let mut store = EntityStore::new();
        store.load(Fetched::HydrogenPlants(vec![HydrogenPlantMarker::new(
            9, "Plant", 30.0, -95.0,
        )]));
        store.load(Fetched::Renewables(vec![RenewableMarker::new(
            9, "Wind", 35.0, -101.0,
        )]));
        let plant = store.get(&EntityRef::HydrogenPlant(9)).unwrap();
        let wind = store.get(&EntityRef::Renewable(9)).unwrap();
        assert_eq!(plant.label(), "Plant");
        assert_eq!(wind.label(), "Wind");
        assert_eq!(store.marker_points().count(), 2);
    }

    #[test]
    fn layer_counts_ignore_filters() {
        let mut store = EntityStore::new();
        store.load(Fetched::Assets(vec![asset("a"), asset("b")]));
        store.load(Fetched::HydrogenPlants(vec![HydrogenPlantMarker::new(
            1, "Plant", 30.0, -95.0,
        )]));
        let counts = store.layer_counts();
        assert_eq!(counts.get(Layer::HydrogenPlant), 3);
        assert_eq!(counts.get(Layer::Pipeline), 0);
    }

    #[test]
    fn layer_counts_follow_each_asset_type() {
        let mut store = EntityStore::new();
        let assets = AssetType::ALL
            .into_iter()
            .map(|asset_type| {
                let mut record = asset(asset_type.as_str());
                record.asset_type = asset_type;
                record
            })
            .collect();
        store.load(Fetched::Assets(assets));
        let counts = store.layer_counts();
        for asset_type in AssetType::ALL {
            let layer = Layer::for_category(asset_type.into());
            assert_eq!(layer.map(|layer| counts.get(layer)), Some(1), "{asset_type:?}");
        }
    }
}
