//! Application configuration read from the environment.

use std::path::PathBuf;

use crate::catalog::CatalogSource;
use crate::openroute::{DEFAULT_BASE_URL, OpenRouteConfig};
use crate::planner::{Corridor, PlanError, VehicleProfile};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fuel_price_file: PathBuf,
    pub cities_file: PathBuf,
    pub vehicle_range_miles: f64,
    pub vehicle_mpg: f64,
    /// Corridor width used by both candidate filtering stages.
    pub max_off_route_miles: f64,
    pub routing_api_key: Option<String>,
    pub routing_api_base_url: String,
    pub routing_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fuel_price_file: PathBuf::from("data/fuel_prices.csv"),
            cities_file: PathBuf::from("data/us_cities.csv"),
            vehicle_range_miles: 500.0,
            vehicle_mpg: 10.0,
            max_off_route_miles: 10.0,
            routing_api_key: None,
            routing_api_base_url: DEFAULT_BASE_URL.to_string(),
            routing_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from an arbitrary variable lookup; unset or empty
    /// variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get("FUEL_PRICE_FILE") {
            config.fuel_price_file = PathBuf::from(path);
        }
        if let Some(path) = get("US_CITIES_FILE") {
            config.cities_file = PathBuf::from(path);
        }
        if let Some(value) = get("VEHICLE_RANGE_MILES") {
            config.vehicle_range_miles = parse("VEHICLE_RANGE_MILES", value)?;
        }
        if let Some(value) = get("VEHICLE_MPG") {
            config.vehicle_mpg = parse("VEHICLE_MPG", value)?;
        }
        if let Some(value) = get("MAX_OFF_ROUTE_MILES") {
            config.max_off_route_miles = parse("MAX_OFF_ROUTE_MILES", value)?;
        }
        config.routing_api_key = get("ROUTING_API_KEY");
        if let Some(url) = get("ROUTING_API_BASE_URL") {
            config.routing_api_base_url = url;
        }
        if let Some(value) = get("ROUTING_TIMEOUT_SECS") {
            config.routing_timeout_secs = parse("ROUTING_TIMEOUT_SECS", value)?;
        }

        Ok(config)
    }

    pub fn catalog_source(&self) -> CatalogSource {
        CatalogSource::new(&self.fuel_price_file).with_cities(&self.cities_file)
    }

    pub fn vehicle(&self) -> Result<VehicleProfile, PlanError> {
        VehicleProfile::new(self.vehicle_range_miles, self.vehicle_mpg)
    }

    pub fn corridor(&self) -> Corridor {
        Corridor::uniform(self.max_off_route_miles)
    }

    pub fn open_route(&self) -> OpenRouteConfig {
        OpenRouteConfig {
            base_url: self.routing_api_base_url.clone(),
            api_key: self.routing_api_key.clone(),
            timeout_secs: self.routing_timeout_secs,
        }
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}
