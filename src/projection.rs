//! Projection of stations onto a route polyline.
//!
//! Off-route distance is measured to segment endpoints only, never to the
//! interior of a segment, so long straight segments under-report how close
//! a station actually is.

use crate::catalog::{Catalog, FuelStation};
use crate::haversine::haversine_miles;
use crate::polyline::RoutePoint;

/// Where a point lands relative to the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub along_route_miles: f64,
    pub off_route_miles: f64,
}

/// A station inside the route corridor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub station: &'a FuelStation,
    pub along_route_miles: f64,
    pub off_route_miles: f64,
}

/// Cumulative mileage for one route geometry.
#[derive(Debug, Clone)]
pub struct RouteProjector<'g> {
    geometry: &'g [RoutePoint],
    cumulative: Vec<f64>,
}

impl<'g> RouteProjector<'g> {
    pub fn new(geometry: &'g [RoutePoint]) -> Self {
        Self {
            geometry,
            cumulative: cumulative_distances(geometry),
        }
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Haversine length of the whole polyline.
    pub fn length_miles(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn project(&self, lat: f64, lng: f64) -> Projection {
        project(lat, lng, self.geometry, &self.cumulative)
    }

    /// Stations from `indices` within `max_off_route_miles`, sorted by
    /// along-route distance. Equal distances keep the order of `indices`.
    pub fn candidates<'c>(
        &self,
        catalog: &'c Catalog,
        indices: impl IntoIterator<Item = usize>,
        max_off_route_miles: f64,
    ) -> Vec<Candidate<'c>> {
        let mut candidates: Vec<Candidate<'c>> = indices
            .into_iter()
            .filter_map(|i| catalog.get(i))
            .filter_map(|station| {
                let projection = self.project(station.latitude, station.longitude);
                (projection.off_route_miles <= max_off_route_miles).then_some(Candidate {
                    station,
                    along_route_miles: projection.along_route_miles,
                    off_route_miles: projection.off_route_miles,
                })
            })
            .collect();

        candidates.sort_by(|a, b| a.along_route_miles.total_cmp(&b.along_route_miles));
        candidates
    }
}

/// One entry per vertex: `0` for the first, then running haversine totals.
pub fn cumulative_distances(geometry: &[RoutePoint]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(geometry.len());
    let mut total = 0.0;
    if !geometry.is_empty() {
        cumulative.push(total);
    }
    for pair in geometry.windows(2) {
        total += haversine_miles(pair[0].lat, pair[0].lng, pair[1].lat, pair[1].lng);
        cumulative.push(total);
    }
    cumulative
}

/// Nearest segment endpoint to `(lat, lng)` across all segments.
///
/// The along-route distance is that of the endpoint achieving the minimum;
/// the earliest segment wins ties. Geometries with fewer than two vertices
/// have no segments and project to `(0, +inf)`.
pub fn project(lat: f64, lng: f64, geometry: &[RoutePoint], cumulative: &[f64]) -> Projection {
    let mut best = Projection {
        along_route_miles: 0.0,
        off_route_miles: f64::INFINITY,
    };

    for (i, pair) in geometry.windows(2).enumerate() {
        let to_start = haversine_miles(lat, lng, pair[0].lat, pair[0].lng);
        let to_end = haversine_miles(lat, lng, pair[1].lat, pair[1].lng);
        let (off, vertex) = if to_start <= to_end {
            (to_start, i)
        } else {
            (to_end, i + 1)
        };

        if off < best.off_route_miles {
            best = Projection {
                along_route_miles: cumulative[vertex],
                off_route_miles: off,
            };
        }
    }

    best
}
