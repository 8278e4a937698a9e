//! Route geometries.
//!
//! Directions providers hand geometries back as Google encoded polylines;
//! decoding happens once at that boundary and the rest of the crate works
//! with plain coordinate sequences.

use serde::{Deserialize, Serialize};

use crate::haversine::Coordinate;

/// One vertex of a route polyline.
pub type RoutePoint = Coordinate;

/// Precision factor of the encoded polyline format (5 decimal places).
const POLYLINE_PRECISION: f64 = 1e5;

/// Ordered route vertices, first = origin, last = destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<RoutePoint>,
}

impl Polyline {
    pub fn new(points: Vec<RoutePoint>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<RoutePoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Decodes a Google encoded polyline string.
    pub fn decode(encoded: &str) -> Result<Self, PolylineError> {
        let bytes = encoded.as_bytes();
        let mut index = 0;
        let mut lat: i64 = 0;
        let mut lng: i64 = 0;
        let mut points = Vec::new();

        while index < bytes.len() {
            lat = accumulate(lat, bytes, &mut index)?;
            lng = accumulate(lng, bytes, &mut index)?;
            points.push(RoutePoint::new(
                lat as f64 / POLYLINE_PRECISION,
                lng as f64 / POLYLINE_PRECISION,
            ));
        }

        Ok(Self { points })
    }
}

impl From<Vec<RoutePoint>> for Polyline {
    fn from(points: Vec<RoutePoint>) -> Self {
        Self::new(points)
    }
}

/// A route as returned by a directions provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub distance_miles: f64,
    pub duration_seconds: f64,
    pub geometry: Polyline,
}

impl RouteInfo {
    pub fn new(distance_miles: f64, duration_seconds: f64, geometry: Polyline) -> Self {
        Self {
            distance_miles,
            duration_seconds,
            geometry,
        }
    }

    /// Fewer than two vertices means there is nothing to drive along.
    pub fn is_degenerate(&self) -> bool {
        self.geometry.len() < 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolylineError {
    #[error("encoded polyline ends mid-value at byte {position}")]
    Truncated { position: usize },

    #[error("invalid polyline character at byte {position}")]
    InvalidCharacter { position: usize },

    #[error("polyline value starting before byte {position} overflows")]
    Overflow { position: usize },
}

/// Adds the next delta to a running total, rejecting totals that leave `i64`.
fn accumulate(total: i64, bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let position = *index;
    total
        .checked_add(next_delta(bytes, index)?)
        .ok_or(PolylineError::Overflow { position })
}

/// Reads one zig-zag encoded varint and advances `index` past it.
fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut shift = 0;
    let mut result: i64 = 0;

    loop {
        let position = *index;
        let byte = *bytes
            .get(position)
            .ok_or(PolylineError::Truncated { position })?;
        if !(63..127).contains(&byte) {
            return Err(PolylineError::InvalidCharacter { position });
        }
        if shift > 55 {
            return Err(PolylineError::Overflow { position });
        }

        let chunk = i64::from(byte - 63);
        *index += 1;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
