//! Addresses and coordinates shared by rides and drivers.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in miles.
    pub fn distance_miles(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
    }

    /// Linear step toward `target`; `fraction` is clamped to `[0, 1]`.
    pub fn toward(&self, target: &Coordinate, fraction: f64) -> Coordinate {
        let t = fraction.clamp(0.0, 1.0);
        Coordinate {
            lat: self.lat + (target.lat - self.lat) * t,
            lng: self.lng + (target.lng - self.lng) * t,
        }
    }
}

/// A pickup or drop-off point: what the rider typed, plus an optional fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
}

impl Location {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            coordinate: None,
        }
    }

    pub fn with_coordinate(mut self, lat: f64, lng: f64) -> Self {
        self.coordinate = Some(Coordinate::new(lat, lng));
        self
    }

    pub fn is_blank(&self) -> bool {
        self.address.trim().is_empty()
    }
}

impl From<&str> for Location {
    fn from(address: &str) -> Self {
        Location::new(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_zero_for_same_point() {
        let p = Coordinate::new(40.7128, -74.0060);
        assert!(p.distance_miles(&p) < 1e-9);
    }

    #[test]
    fn distance_between_known_points() {
        // Times Square to lower Manhattan, a little over three miles.
        let a = Coordinate::new(40.7580, -73.9855);
        let b = Coordinate::new(40.7128, -74.0060);
        let miles = a.distance_miles(&b);
        assert!(miles > 3.0 && miles < 3.5, "got {}", miles);
    }

    #[test]
    fn toward_clamps_fraction() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(10.0, 20.0);
        assert_eq!(a.toward(&b, 0.5), Coordinate::new(5.0, 10.0));
        assert_eq!(a.toward(&b, 2.0), b);
        assert_eq!(a.toward(&b, -1.0), a);
    }

    #[test]
    fn blank_addresses() {
        assert!(Location::new("   ").is_blank());
        assert!(!Location::from("123 Main St").is_blank());
    }
}
