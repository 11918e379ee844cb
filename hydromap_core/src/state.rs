//! Shared filter, layer and selection state with change notification.
//!
//! One [`DashboardState`] exists per session. Panels read it through the
//! owning [`crate::Dashboard`] and learn about changes by draining the
//! receiver returned from [`DashboardState::subscribe`]. Subscribers whose
//! receiver was dropped are pruned on the next notification.

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, trace};

use crate::category::{Dataset, EntityRef};
use crate::filter::FilterState;
use crate::layers::{Layer, LayerState};
use crate::selection::{PredictionRef, Selection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    FilterChanged,
    LayerToggled(Layer),
    SelectionChanged(Option<EntityRef>),
    PredictionChanged(Option<PredictionRef>),
    DatasetUpdated(Dataset),
}

#[derive(Debug)]
pub struct DashboardState {
    initial_layers: LayerState,
    filter: FilterState,
    layers: LayerState,
    selection: Selection,
    revision: u64,
    visibility_revision: u64,
    subscribers: Vec<Sender<StateEvent>>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(LayerState::default())
    }
}

impl DashboardState {
    pub fn new(layers: LayerState) -> Self {
        Self {
            initial_layers: layers,
            filter: FilterState::default(),
            layers,
            selection: Selection::default(),
            revision: 0,
            visibility_revision: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<StateEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn layers(&self) -> LayerState {
        self.layers
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_entity(&self) -> Option<&EntityRef> {
        self.selection.entity.get()
    }

    pub fn selected_prediction(&self) -> Option<&PredictionRef> {
        self.selection.prediction.get()
    }

    /// Bumped on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bumped only when the filter or the layers change, i.e. when the set of
    /// visible entities may differ.
    pub fn visibility_revision(&self) -> u64 {
        self.visibility_revision
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.visibility_revision += 1;
        self.publish(StateEvent::FilterChanged);
    }

    pub fn update_filter(&mut self, edit: impl FnOnce(&mut FilterState)) {
        let mut next = self.filter.clone();
        edit(&mut next);
        self.set_filter(next);
    }

    pub fn toggle_layer(&mut self, layer: Layer) {
        self.layers.toggle_layer(layer);
        self.visibility_revision += 1;
        self.publish(StateEvent::LayerToggled(layer));
    }

    pub fn set_layer(&mut self, layer: Layer, visible: bool) {
        if self.layers.is_on(layer) != visible {
            self.toggle_layer(layer);
        }
    }

    pub fn select_entity(&mut self, entity: EntityRef) {
        if self.selection.entity.select(entity.clone()) {
            self.publish(StateEvent::SelectionChanged(Some(entity)));
        }
    }

    pub fn clear_entity(&mut self) {
        if self.selection.entity.clear() {
            self.publish(StateEvent::SelectionChanged(None));
        }
    }

    pub fn select_prediction(&mut self, prediction: PredictionRef) {
        if self.selection.prediction.select(prediction.clone()) {
            self.publish(StateEvent::PredictionChanged(Some(prediction)));
        }
    }

    pub fn clear_prediction(&mut self) {
        if self.selection.prediction.clear() {
            self.publish(StateEvent::PredictionChanged(None));
        }
    }

    /// Announce that a dataset's records were replaced. Does not touch the
    /// state revision; the store tracks its own.
    pub fn dataset_updated(&mut self, dataset: Dataset) {
        self.broadcast(StateEvent::DatasetUpdated(dataset));
    }

    /// Restore filter, layers and selection to their session defaults.
    /// Subscriptions survive a reset.
    pub fn reset(&mut self) {
        self.set_filter(FilterState::default());
        for layer in Layer::ALL {
            self.set_layer(layer, self.initial_layers.is_on(layer));
        }
        self.clear_entity();
        self.clear_prediction();
        debug!(target: "hydromap::state", "state.reset");
    }

    fn publish(&mut self, event: StateEvent) {
        self.revision += 1;
        self.broadcast(event);
    }

    fn broadcast(&mut self, event: StateEvent) {
        trace!(target: "hydromap::state", ?event, revision = self.revision, "state.notify");
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}
