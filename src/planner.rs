//! Greedy refueling planner.
//!
//! The vehicle leaves with a full tank. Whenever it cannot finish on what is
//! left, it drives to the cheapest station it can reach (the nearer one on a
//! price tie) and buys just enough to reach the nearest strictly cheaper
//! station within one tank, or fills up when nothing cheaper is in range.
//! Purchases never exceed what is needed to finish the route.
//!
//! This is myopic, not globally optimal.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{Catalog, FuelStation};
use crate::projection::{Candidate, RouteProjector};
use crate::polyline::RouteInfo;

/// Distances below this many miles are treated as zero.
pub const EPSILON_MILES: f64 = 1e-6;

const DEFAULT_RANGE_MILES: f64 = 500.0;
const DEFAULT_MPG: f64 = 10.0;
const DEFAULT_CORRIDOR_MILES: f64 = 10.0;

/// Tank range and fuel economy, both finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleProfile {
    range_miles: f64,
    mpg: f64,
}

impl VehicleProfile {
    pub fn new(range_miles: f64, mpg: f64) -> Result<Self, PlanError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(range_miles) || !valid(mpg) {
            return Err(PlanError::InvalidVehicle { range_miles, mpg });
        }
        Ok(Self { range_miles, mpg })
    }

    pub fn range_miles(&self) -> f64 {
        self.range_miles
    }

    pub fn mpg(&self) -> f64 {
        self.mpg
    }
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self {
            range_miles: DEFAULT_RANGE_MILES,
            mpg: DEFAULT_MPG,
        }
    }
}

/// Corridor widths for the two candidate filtering stages.
///
/// Keep both equal unless you know why they should differ: a station the
/// sampling stage misses never reaches the projection stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corridor {
    /// Radius around each sampled vertex in the spatial index query.
    pub sampling_radius_miles: f64,
    /// Maximum projected off-route distance for a station to be a candidate.
    pub max_off_route_miles: f64,
}

impl Corridor {
    pub fn uniform(width_miles: f64) -> Self {
        Self {
            sampling_radius_miles: width_miles,
            max_off_route_miles: width_miles,
        }
    }
}

impl Default for Corridor {
    fn default() -> Self {
        Self::uniform(DEFAULT_CORRIDOR_MILES)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("vehicle range ({range_miles} mi) and mpg ({mpg}) must be positive and finite")]
    InvalidVehicle { range_miles: f64, mpg: f64 },
}

/// A single planned purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelStopPlan {
    pub station: FuelStation,
    pub distance_along_route_miles: f64,
    pub gallons_purchased: f64,
    pub cost_usd: f64,
}

/// How planning ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// The destination is reachable with the planned stops.
    Arrived,
    /// No reachable station from `position_miles`; the stops are a partial plan.
    Stranded { position_miles: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPlan {
    pub stops: Vec<FuelStopPlan>,
    pub outcome: PlanOutcome,
}

impl FuelPlan {
    pub fn is_feasible(&self) -> bool {
        matches!(self.outcome, PlanOutcome::Arrived)
    }

    pub fn total_gallons(&self) -> f64 {
        self.stops.iter().map(|s| s.gallons_purchased).sum()
    }

    pub fn total_cost_usd(&self) -> f64 {
        self.stops.iter().map(|s| s.cost_usd).sum()
    }
}

/// Plans refueling for `route` using stations from `catalog`.
///
/// Routes with fewer than two vertices count as zero distance and arrive
/// without stops.
pub fn plan(
    catalog: &Catalog,
    route: &RouteInfo,
    vehicle: &VehicleProfile,
    corridor: &Corridor,
) -> FuelPlan {
    if route.is_degenerate() {
        return FuelPlan {
            stops: Vec::new(),
            outcome: PlanOutcome::Arrived,
        };
    }

    let candidates = route_candidates(catalog, route, corridor);
    debug!(
        candidates = candidates.len(),
        route_miles = route.distance_miles,
        "route candidates"
    );
    plan_stops(&candidates, route.distance_miles, vehicle)
}

/// Stations near `route`: spatial index sampling, then projection filtering.
pub fn route_candidates<'c>(
    catalog: &'c Catalog,
    route: &RouteInfo,
    corridor: &Corridor,
) -> Vec<Candidate<'c>> {
    let geometry = route.geometry.points();
    let nearby = catalog
        .spatial_index()
        .near_route_query(geometry, corridor.sampling_radius_miles);

    RouteProjector::new(geometry).candidates(catalog, nearby, corridor.max_off_route_miles)
}

/// Runs the greedy policy over `candidates`, which must be sorted by
/// along-route distance.
pub fn plan_stops(
    candidates: &[Candidate<'_>],
    route_distance: f64,
    vehicle: &VehicleProfile,
) -> FuelPlan {
    let range = vehicle.range_miles;
    let mut stops = Vec::new();
    let mut position = 0.0;
    let mut fuel_miles = range;

    while position < route_distance {
        if position + fuel_miles + EPSILON_MILES >= route_distance {
            break;
        }

        let reach = position + fuel_miles + EPSILON_MILES;
        let Some(chosen) = cheapest_in(candidates, position, reach) else {
            warn!(
                position_miles = position,
                route_miles = route_distance,
                stops = stops.len(),
                "no reachable station; returning partial plan"
            );
            return FuelPlan {
                stops,
                outcome: PlanOutcome::Stranded {
                    position_miles: position,
                },
            };
        };

        fuel_miles = (fuel_miles - (chosen.along_route_miles - position)).max(0.0);
        position = chosen.along_route_miles;
        let price = chosen.station.price_per_gallon;

        let wanted = match nearest_cheaper(candidates, position, position + range, price) {
            Some(cheaper) => (cheaper.along_route_miles - position) - fuel_miles,
            None => range - fuel_miles,
        };
        let to_finish = route_distance - position - fuel_miles;
        let distance_needed = wanted.min(to_finish).max(0.0);

        if distance_needed < EPSILON_MILES {
            continue;
        }

        let gallons = distance_needed / vehicle.mpg;
        let cost = gallons * price;
        fuel_miles += distance_needed;
        debug!(
            station = %chosen.station.station_id,
            along_miles = position,
            gallons,
            cost,
            "fuel stop"
        );

        stops.push(FuelStopPlan {
            station: chosen.station.clone(),
            distance_along_route_miles: position,
            gallons_purchased: gallons,
            cost_usd: cost,
        });
    }

    FuelPlan {
        stops,
        outcome: PlanOutcome::Arrived,
    }
}

/// Candidates with along-route distance in `(after, up_to]`.
fn window<'a, 'c>(
    candidates: &'a [Candidate<'c>],
    after: f64,
    up_to: f64,
) -> impl Iterator<Item = &'a Candidate<'c>> {
    candidates
        .iter()
        .skip_while(move |c| c.along_route_miles <= after)
        .take_while(move |c| c.along_route_miles <= up_to)
}

/// Cheapest candidate in the window; the nearest wins on equal price.
fn cheapest_in<'a, 'c>(
    candidates: &'a [Candidate<'c>],
    after: f64,
    up_to: f64,
) -> Option<&'a Candidate<'c>> {
    // `min_by` keeps the first of equal elements, and the window is ordered by distance.
    window(candidates, after, up_to)
        .min_by(|a, b| a.station.price_per_gallon.total_cmp(&b.station.price_per_gallon))
}

/// Nearest candidate in the window strictly cheaper than `price`.
fn nearest_cheaper<'a, 'c>(
    candidates: &'a [Candidate<'c>],
    after: f64,
    up_to: f64,
    price: f64,
) -> Option<&'a Candidate<'c>> {
    window(candidates, after, up_to).find(|c| c.station.price_per_gallon < price)
}
