//! fuel-planner core
//!
//! Cost-minimizing refueling plans along a driving route: a station catalog
//! with a sampled spatial index, projection of stations onto the route, and
//! a greedy look-ahead planner.

pub mod traits;
pub mod haversine;
pub mod polyline;
pub mod cities;
pub mod catalog;
pub mod spatial;
pub mod projection;
pub mod planner;
pub mod osrm;
pub mod openroute;
pub mod city_data;
pub mod config;

pub use catalog::{Catalog, CatalogCache, CatalogSource, FuelStation, load_catalog};
pub use planner::{Corridor, FuelPlan, FuelStopPlan, PlanOutcome, VehicleProfile, plan};
pub use polyline::{Polyline, RouteInfo, RoutePoint};
