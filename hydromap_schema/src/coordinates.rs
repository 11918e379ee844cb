use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a position only when both components are finite and inside the
    /// WGS84 ranges.
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let candidate = Self { lat, lng };
        candidate.is_valid().then_some(candidate)
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// One coordinate component as the upstream feeds deliver it.
///
/// Usually a JSON number, sometimes a numeric string, occasionally `null` or
/// something else entirely. Parsing is deferred to [`Coordinate::degrees`] so
/// a single bad marker never fails the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Default for Coordinate {
    fn default() -> Self {
        Coordinate::Other(Value::Null)
    }
}

impl Coordinate {
    /// Finite decimal degrees, or `None` when the value does not parse.
    pub fn degrees(&self) -> Option<f64> {
        let value = match self {
            Coordinate::Number(value) => Some(*value),
            Coordinate::Text(text) => text.trim().parse::<f64>().ok(),
            Coordinate::Other(_) => None,
        };
        value.filter(|v| v.is_finite())
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        Coordinate::Number(value)
    }
}

impl From<&str> for Coordinate {
    fn from(value: &str) -> Self {
        Coordinate::Text(value.to_string())
    }
}

/// An unvalidated `{lat, lng}` pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLatLng {
    #[serde(default)]
    pub lat: Coordinate,
    #[serde(default)]
    pub lng: Coordinate,
}

impl RawLatLng {
    pub fn new(lat: impl Into<Coordinate>, lng: impl Into<Coordinate>) -> Self {
        Self {
            lat: lat.into(),
            lng: lng.into(),
        }
    }

    pub fn resolve(&self) -> Option<LatLng> {
        LatLng::checked(self.lat.degrees()?, self.lng.degrees()?)
    }
}

impl From<LatLng> for RawLatLng {
    fn from(value: LatLng) -> Self {
        Self::new(value.lat, value.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_parse() {
        assert_eq!(Coordinate::from("  40.5 ").degrees(), Some(40.5));
        assert_eq!(Coordinate::from(-98.25).degrees(), Some(-98.25));
    }

    #[test]
    fn non_finite_and_garbage_are_rejected() {
        assert_eq!(Coordinate::from("NaN").degrees(), None);
        assert_eq!(Coordinate::from("inf").degrees(), None);
        assert_eq!(Coordinate::from("north").degrees(), None);
        assert_eq!(Coordinate::default().degrees(), None);
        assert_eq!(Coordinate::Number(f64::NAN).degrees(), None);
    }

    #[test]
    fn out_of_range_positions_do_not_resolve() {
        assert!(RawLatLng::new(91.0, 10.0).resolve().is_none());
        assert!(RawLatLng::new(10.0, -180.5).resolve().is_none());
        assert_eq!(
            RawLatLng::new("29.76", -95.37).resolve(),
            Some(LatLng::new(29.76, -95.37))
        );
    }

    #[test]
    fn mixed_json_shapes_deserialize() {
        let raw: RawLatLng = serde_json::from_str(r#"{"lat": "31.9", "lng": -102}"#).unwrap();
        assert_eq!(raw.resolve(), Some(LatLng::new(31.9, -102.0)));

        let raw: RawLatLng = serde_json::from_str(r#"{"lat": null, "lng": true}"#).unwrap();
        assert!(raw.resolve().is_none());

        let raw: RawLatLng = serde_json::from_str(r#"{}"#).unwrap();
        assert!(raw.resolve().is_none());
    }
}
