//! OSRM HTTP adapter for driving routes.

use serde::Deserialize;

use crate::haversine::{Coordinate, meters_to_miles};
use crate::polyline::{Polyline, RouteInfo};
use crate::traits::{RouteProvider, RoutingError};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, start: Coordinate, end: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=polyline",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            start.lng,
            start.lat,
            end.lng,
            end.lat,
        )
    }
}

impl RouteProvider for OsrmClient {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<RouteInfo, RoutingError> {
        let response = self.client.get(self.route_url(start, end)).send()?;

        let status = response.status();
        let body = response.text()?;
        // OSRM answers "NoRoute" with 400, so parse before checking status.
        match serde_json::from_str::<OsrmRouteResponse>(&body) {
            Ok(parsed) => parsed.into_route_info(),
            Err(_) if !status.is_success() => Err(RoutingError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            }),
            Err(err) => Err(RoutingError::UnexpectedResponse(err.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: String,
}

impl OsrmRouteResponse {
    fn into_route_info(self) -> Result<RouteInfo, RoutingError> {
        match self.code.as_str() {
            "Ok" => {}
            "NoRoute" | "NoSegment" => return Err(RoutingError::NoRoute),
            other => {
                return Err(RoutingError::UnexpectedResponse(format!(
                    "{other}: {}",
                    self.message.unwrap_or_default()
                )));
            }
        }

        let route = self.routes.into_iter().next().ok_or(RoutingError::NoRoute)?;
        Ok(RouteInfo::new(
            meters_to_miles(route.distance),
            route.duration,
            Polyline::decode(&route.geometry)?,
        ))
    }
}
