//! OpenRouteService directions adapter.

use serde::Deserialize;
use serde_json::json;

use crate::haversine::{Coordinate, meters_to_miles};
use crate::polyline::{Polyline, RouteInfo, RoutePoint};
use crate::traits::{RouteProvider, RoutingError};

pub const DEFAULT_BASE_URL: &str =
    "https://api.openrouteservice.org/v2/directions/driving-car/json";

#[derive(Debug, Clone)]
pub struct OpenRouteConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for OpenRouteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenRouteClient {
    config: OpenRouteConfig,
    client: reqwest::blocking::Client,
}

impl OpenRouteClient {
    pub fn new(config: OpenRouteConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl RouteProvider for OpenRouteClient {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<RouteInfo, RoutingError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(RoutingError::MissingApiKey)?;

        // ORS wants [lng, lat].
        let body = json!({
            "coordinates": [[start.lng, start.lat], [end.lng, end.lat]],
        });

        let response = self
            .client
            .post(&self.config.base_url)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(RoutingError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let parsed: OrsResponse = response
            .json()
            .map_err(|err| RoutingError::UnexpectedResponse(err.to_string()))?;
        parsed.into_route_info()
    }
}

#[derive(Debug, Deserialize)]
struct OrsResponse {
    #[serde(default)]
    routes: Vec<OrsRoute>,
}

#[derive(Debug, Deserialize)]
struct OrsRoute {
    summary: OrsSummary,
    geometry: Option<OrsGeometry>,
}

/// ORS omits distance and duration when the two points coincide.
#[derive(Debug, Deserialize)]
struct OrsSummary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrsGeometry {
    Encoded(String),
    /// `[lng, lat]` pairs, possibly with a trailing elevation.
    Coordinates(Vec<Vec<f64>>),
}

impl OrsResponse {
    fn into_route_info(self) -> Result<RouteInfo, RoutingError> {
        let route = self.routes.into_iter().next().ok_or(RoutingError::NoRoute)?;

        let geometry = match route.geometry {
            Some(OrsGeometry::Encoded(encoded)) => Polyline::decode(&encoded)?,
            Some(OrsGeometry::Coordinates(coords)) => coords
                .into_iter()
                .map(|pair| match pair.as_slice() {
                    [lng, lat, ..] => Ok(RoutePoint::new(*lat, *lng)),
                    _ => Err(RoutingError::UnexpectedResponse(format!(
                        "coordinate with {} values",
                        pair.len()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?
                .into(),
            None => Polyline::default(),
        };

        Ok(RouteInfo::new(
            meters_to_miles(route.summary.distance),
            route.summary.duration,
            geometry,
        ))
    }
}
