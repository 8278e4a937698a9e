//! Station spatial index.
//!
//! Not a tree: station coordinates are converted to radians once, and each
//! query is a linear haversine scan over them. Route proximity samples the
//! polyline so a query costs at most [`MAX_ROUTE_SAMPLES`] radius scans no
//! matter how dense the geometry is. A station close to a vertex that falls
//! between two samples can be missed.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::catalog::FuelStation;
use crate::haversine::haversine_miles_rad;
use crate::polyline::RoutePoint;

/// Upper bound on radius queries issued by [`SpatialIndex::near_route_query`].
pub const MAX_ROUTE_SAMPLES: usize = 150;

#[derive(Debug, Default)]
pub struct SpatialIndex {
    /// `(lat, lng)` in radians, indexed like the catalog.
    coords_rad: Vec<(f64, f64)>,
    radius_queries: AtomicUsize,
}

impl SpatialIndex {
    pub fn build(stations: &[FuelStation]) -> Self {
        let coords_rad = stations
            .par_iter()
            .map(|s| (s.latitude.to_radians(), s.longitude.to_radians()))
            .collect();

        Self {
            coords_rad,
            radius_queries: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.coords_rad.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords_rad.is_empty()
    }

    /// Catalog indices of stations within `radius_miles` of `(lat, lng)`, ascending.
    pub fn radius_query(&self, lat: f64, lng: f64, radius_miles: f64) -> Vec<usize> {
        self.radius_queries.fetch_add(1, Ordering::Relaxed);

        let lat_rad = lat.to_radians();
        let lng_rad = lng.to_radians();

        self.coords_rad
            .iter()
            .enumerate()
            .filter(|(_, (slat, slng))| {
                haversine_miles_rad(lat_rad, lng_rad, *slat, *slng) <= radius_miles
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Catalog indices of stations within `max_off_route_miles` of any sampled
    /// route vertex, sorted and deduplicated.
    pub fn near_route_query(&self, geometry: &[RoutePoint], max_off_route_miles: f64) -> Vec<usize> {
        if geometry.is_empty() || self.coords_rad.is_empty() {
            return Vec::new();
        }

        let mut found = BTreeSet::new();
        for point in geometry.iter().step_by(sample_stride(geometry.len())) {
            found.extend(self.radius_query(point.lat, point.lng, max_off_route_miles));
        }
        found.into_iter().collect()
    }

    /// Total radius queries answered since the index was built.
    pub fn radius_queries_issued(&self) -> usize {
        self.radius_queries.load(Ordering::Relaxed)
    }
}

/// Vertex stride keeping the number of samples at or below [`MAX_ROUTE_SAMPLES`].
///
/// Rounds up rather than using floor division `max(1, n / 150)`, which would
/// sample every vertex of a 299-vertex route.
pub fn sample_stride(vertex_count: usize) -> usize {
    vertex_count.div_ceil(MAX_ROUTE_SAMPLES).max(1)
}
