//! Seams to external collaborators.
//!
//! The planner core never talks to the network. Directions come in through
//! [`RouteProvider`], implemented here for OSRM and OpenRouteService.

use crate::haversine::Coordinate;
use crate::polyline::{PolylineError, RouteInfo};

/// Fetches a driving route between two points.
pub trait RouteProvider {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<RouteInfo, RoutingError>;
}

impl<P: RouteProvider + ?Sized> RouteProvider for &P {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<RouteInfo, RoutingError> {
        (**self).route(start, end)
    }
}

impl<P: RouteProvider + ?Sized> RouteProvider for Box<P> {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<RouteInfo, RoutingError> {
        (**self).route(start, end)
    }
}

/// Why a route could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// Provider needs credentials that were not configured
    #[error("ROUTING_API_KEY is not configured")]
    MissingApiKey,

    /// HTTP request failed (network error, timeout, etc.)
    #[error("error calling routing API: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("routing API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Body did not have the expected shape
    #[error("unexpected routing API response: {0}")]
    UnexpectedResponse(String),

    /// Provider answered but found no route between the points
    #[error("no route found between the given points")]
    NoRoute,

    #[error("invalid route geometry: {0}")]
    Geometry(#[from] PolylineError),
}
