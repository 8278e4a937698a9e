//! Synthetic north-bound routes along a single meridian.
//!
//! Along-route distance maps linearly to latitude, so stations can be placed
//! at exact mileposts.

use fuel_planner::haversine::EARTH_RADIUS_MILES;
use fuel_planner::projection::cumulative_distances;
use fuel_planner::{FuelStation, Polyline, RouteInfo, RoutePoint};

pub const START_LAT: f64 = 30.0;
pub const LNG: f64 = -100.0;

pub fn miles_per_degree() -> f64 {
    EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0
}

pub fn lat_at(miles: f64) -> f64 {
    START_LAT + miles / miles_per_degree()
}

/// Route of `total_miles` with a vertex every `step_miles`.
pub fn meridian_route(total_miles: f64, step_miles: f64) -> RouteInfo {
    let steps = (total_miles / step_miles).round() as usize;
    let points: Vec<RoutePoint> = (0..=steps)
        .map(|i| RoutePoint::new(lat_at(i as f64 * step_miles), LNG))
        .collect();

    let distance = cumulative_distances(&points).last().copied().unwrap_or(0.0);
    RouteInfo::new(distance, distance / 60.0 * 3600.0, Polyline::new(points))
}

/// Station at milepost `miles`, shifted `off_route_miles` east.
pub fn station_at(id: &str, miles: f64, price: f64, off_route_miles: f64) -> FuelStation {
    let lat = lat_at(miles);
    let lng_offset = off_route_miles / (miles_per_degree() * lat.to_radians().cos());
    FuelStation {
        station_id: id.to_string(),
        name: format!("Station {id}"),
        latitude: lat,
        longitude: LNG + lng_offset,
        price_per_gallon: price,
    }
}

/// Generic `id,name,lat,lon,price` CSV for `stations`.
pub fn prices_csv(stations: &[FuelStation]) -> String {
    let mut csv = String::from("id,name,lat,lon,price\n");
    for s in stations {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            s.station_id, s.name, s.latitude, s.longitude, s.price_per_gallon
        ));
    }
    csv
}
