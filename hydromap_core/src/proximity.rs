//! Great-circle distance between map points.

use hydromap_schema::LatLng;

use crate::category::{EntityRef, MapPoint};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nearby<'a> {
    pub point: &'a MapPoint,
    pub distance_km: f64,
}

/// Points within `radius_km` of `center`, nearest first. `exclude` drops the
/// entity the query is centred on.
pub fn nearby<'a>(
    points: &'a [MapPoint],
    center: LatLng,
    radius_km: f64,
    exclude: Option<&EntityRef>,
) -> Vec<Nearby<'a>> {
    let mut found: Vec<Nearby<'a>> = points
        .iter()
        .filter(|point| Some(&point.entity) != exclude)
        .map(|point| Nearby {
            point,
            distance_km: haversine_km(center, point.position),
        })
        .filter(|candidate| candidate.distance_km <= radius_km)
        .collect();
    found.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    found
}
