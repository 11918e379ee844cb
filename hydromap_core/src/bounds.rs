//! Bounding envelopes for viewport auto-fit.

use std::borrow::Borrow;

use hydromap_schema::{LatLng, RawLatLng};
use tracing::trace;

/// Axis-aligned lat/lng envelope. Does not wrap the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn around(point: LatLng) -> Self {
        Self {
            south: point.lat,
            west: point.lng,
            north: point.lat,
            east: point.lng,
        }
    }

    pub fn extend(self, point: LatLng) -> Self {
        Self {
            south: self.south.min(point.lat),
            west: self.west.min(point.lng),
            north: self.north.max(point.lat),
            east: self.east.max(point.lng),
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lng)
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::around(first), Self::extend))
    }
}

/// Envelope over every marker whose coordinates resolve to finite, in-range
/// degrees. Malformed markers are skipped; `None` when none survive.
pub fn fit_bounds<I>(markers: I) -> Option<GeoBounds>
where
    I: IntoIterator,
    I::Item: Borrow<RawLatLng>,
{
    GeoBounds::from_points(
        markers
            .into_iter()
            .filter_map(|marker| marker.borrow().resolve()),
    )
}

/// Identity of a marker sequence: the store's data revision and the state's
/// visibility revision that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerSetId {
    pub data_revision: u64,
    pub visibility_revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportUpdate {
    Fit(GeoBounds),
    Unchanged,
}

/// Refits only when the marker sequence identity changes.
#[derive(Debug, Default)]
pub struct BoundsFitter {
    last: Option<MarkerSetId>,
    bounds: Option<GeoBounds>,
}

impl BoundsFitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<GeoBounds> {
        self.bounds
    }

    pub fn refit(
        &mut self,
        id: MarkerSetId,
        points: impl IntoIterator<Item = LatLng>,
    ) -> ViewportUpdate {
        if self.last == Some(id) {
            return ViewportUpdate::Unchanged;
        }
        self.last = Some(id);
        match GeoBounds::from_points(points) {
            Some(bounds) => {
                trace!(target: "hydromap::state", ?bounds, "viewport.fit");
                self.bounds = Some(bounds);
                ViewportUpdate::Fit(bounds)
            }
            // Keep the previous viewport rather than collapse it.
            None => ViewportUpdate::Unchanged,
        }
    }
}
