//! Geographic coordinates and great-circle distance.
//!
//! Coordinates arrive on the wire as `{lat, lng}` in decimal degrees.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Why a coordinate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("coordinate is not a finite number")]
    NotFinite,
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that latitude and longitude are finite and in range.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordinateError::Latitude(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(CoordinateError::Longitude(self.lng));
        }
        Ok(())
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

/// Haversine distance between two coordinates in kilometres.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}
