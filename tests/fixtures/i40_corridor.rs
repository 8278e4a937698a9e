//! Towns along I-40 from Oklahoma City to Barstow.
//!
//! The route is a straight-line interpolation between towns, not the road
//! network, which is close enough for corridor and spacing checks.

use fuel_planner::{Polyline, RouteInfo, RoutePoint};
use fuel_planner::projection::cumulative_distances;

/// A named town with coordinates.
#[derive(Debug, Clone)]
pub struct Town {
    pub name: &'static str,
    pub state: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Town {
    pub const fn new(name: &'static str, state: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            state,
            lat,
            lng,
        }
    }

    pub fn point(&self) -> RoutePoint {
        RoutePoint::new(self.lat, self.lng)
    }
}

pub const OKLAHOMA_CITY: Town = Town::new("Oklahoma City", "OK", 35.4676, -97.5164);
pub const BARSTOW: Town = Town::new("Barstow", "CA", 34.8958, -117.0173);

/// Interstate towns between the endpoints, in driving order.
pub const WAYPOINTS: &[Town] = &[
    Town::new("Amarillo", "TX", 35.2220, -101.8313),
    Town::new("Tucumcari", "NM", 35.1717, -103.7250),
    Town::new("Santa Rosa", "NM", 34.9387, -104.6825),
    Town::new("Albuquerque", "NM", 35.0844, -106.6504),
    Town::new("Gallup", "NM", 35.5281, -108.7426),
    Town::new("Flagstaff", "AZ", 35.1983, -111.6513),
    Town::new("Kingman", "AZ", 35.1894, -114.0530),
];

/// Well north of the corridor.
pub const DENVER: Town = Town::new("Denver", "CO", 39.7392, -104.9903);

/// City table in the kelvins US-Cities-Database layout.
pub fn cities_csv() -> String {
    let mut csv = String::from("ID,STATE_CODE,STATE_NAME,CITY,COUNTY,LATITUDE,LONGITUDE\n");
    let towns = WAYPOINTS
        .iter()
        .chain([&OKLAHOMA_CITY, &BARSTOW, &DENVER]);
    for (i, town) in towns.enumerate() {
        csv.push_str(&format!(
            "{},{},,{},,{},{}\n",
            i + 1,
            town.state,
            town.name,
            town.lat,
            town.lng
        ));
    }
    csv
}

/// OPIS-style price file: one truckstop per waypoint, one in Denver, and two
/// rows that must be skipped.
pub fn opis_prices_csv() -> String {
    let prices = [3.59, 3.29, 3.49, 3.19, 3.69, 3.99, 4.09];
    let mut csv = String::from(
        "OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price\n",
    );
    for (i, (town, price)) in WAYPOINTS.iter().zip(prices).enumerate() {
        csv.push_str(&format!(
            "{},{} TRAVEL CENTER,I-40,{},{},{},{}\n",
            100 + i,
            town.name.to_uppercase(),
            town.name,
            town.state,
            200 + i,
            price
        ));
    }
    csv.push_str(&format!("900,DENVER FUEL,I-25,Denver,CO,299,{}\n", 2.49));
    csv.push_str("901,NOWHERE STOP,I-40,Nowhere,NM,300,3.00\n");
    csv.push_str("902,NO PRICE,I-40,Gallup,NM,301,\n");
    csv
}

/// Route through every waypoint with `points_per_leg` vertices per leg.
pub fn i40_route(points_per_leg: usize) -> RouteInfo {
    let stops: Vec<&Town> = std::iter::once(&OKLAHOMA_CITY)
        .chain(WAYPOINTS.iter())
        .chain(std::iter::once(&BARSTOW))
        .collect();

    let mut points = Vec::new();
    for leg in stops.windows(2) {
        let (from, to) = (leg[0], leg[1]);
        for step in 0..points_per_leg {
            let t = step as f64 / points_per_leg as f64;
            points.push(RoutePoint::new(
                from.lat + (to.lat - from.lat) * t,
                from.lng + (to.lng - from.lng) * t,
            ));
        }
    }
    points.push(BARSTOW.point());

    let distance = cumulative_distances(&points).last().copied().unwrap_or(0.0);
    RouteInfo::new(distance, distance / 65.0 * 3600.0, Polyline::new(points))
}
