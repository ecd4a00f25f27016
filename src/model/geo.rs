use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: Coordinates) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng * 0.5).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// A single position fix as emitted by geolocation acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoResult {
    pub lat: f64,
    pub lng: f64,
    /// Direction of travel in degrees, when the backend reports one.
    pub heading: Option<f64>,
    /// Ground speed in metres per second.
    pub speed: Option<f64>,
}

impl GeoResult {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            heading: None,
            speed: None,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Acquisition status as seen by the caller.
///
/// Within one failure episode the status only moves forward; the only way
/// back to `Loading` after `Denied` or `Unsupported` is an explicit retry or start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoStatus {
    #[default]
    Idle,
    Loading,
    Granted,
    Denied,
    Unavailable,
    Unsupported,
}

impl GeoStatus {
    /// Terminal states never schedule automatic retries.
    pub fn is_terminal(self) -> bool {
        matches!(self, GeoStatus::Denied | GeoStatus::Unsupported)
    }
}
