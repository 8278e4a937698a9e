//! Great-circle distance helpers.
//!
//! Everything in the planner is measured in statute miles.

use serde::{Deserialize, Serialize};

/// Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

const METERS_PER_MILE: f64 = 1609.344;

/// A latitude/longitude pair in signed degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Haversine distance to another coordinate in miles.
    pub fn miles_to(&self, other: &Coordinate) -> f64 {
        haversine_miles(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Haversine distance in miles between two points given in degrees.
pub fn haversine_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    haversine_miles_rad(
        lat1.to_radians(),
        lng1.to_radians(),
        lat2.to_radians(),
        lng2.to_radians(),
    )
}

/// Haversine distance in miles between two points already converted to radians.
pub fn haversine_miles_rad(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let delta_lat = lat2 - lat1;
    let delta_lng = lng2 - lng1;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.min(1.0).sqrt().asin();

    EARTH_RADIUS_MILES * c
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}
