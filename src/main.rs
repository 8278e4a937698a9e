use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use fuel_planner::city_data::{CityDataset, CityDatasetConfig};
use fuel_planner::config::AppConfig;
use fuel_planner::haversine::Coordinate;
use fuel_planner::openroute::OpenRouteClient;
use fuel_planner::osrm::{OsrmClient, OsrmConfig};
use fuel_planner::traits::RouteProvider;
use fuel_planner::{CatalogCache, FuelStopPlan, PlanOutcome, RoutePoint, VehicleProfile, plan};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan the cheapest fuel stops along a driving route")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a route and print the fuel plan as JSON
    Plan {
        #[arg(long, allow_negative_numbers = true)]
        start_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        start_lng: f64,
        #[arg(long, allow_negative_numbers = true)]
        end_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        end_lng: f64,

        /// Directions provider
        #[arg(long, value_enum, default_value_t = Provider::Ors)]
        provider: Provider,

        /// OSRM base URL (only with --provider osrm)
        #[arg(long, default_value = "http://localhost:5000")]
        osrm_url: String,

        /// Override VEHICLE_RANGE_MILES
        #[arg(long)]
        range: Option<f64>,

        /// Override VEHICLE_MPG
        #[arg(long)]
        mpg: Option<f64>,
    },
    /// Download the US cities table used to place stations by city/state
    DownloadCities {
        /// Re-download even if the file exists
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Provider {
    Ors,
    Osrm,
}

#[derive(Serialize)]
struct PlanReport<'a> {
    distance_miles: f64,
    duration_seconds: f64,
    geometry: &'a [RoutePoint],
    fuel_stops: Vec<StopReport<'a>>,
    total_gallons: f64,
    total_cost_usd: f64,
    feasible: bool,
    outcome: PlanOutcome,
}

#[derive(Serialize)]
struct StopReport<'a> {
    station_id: &'a str,
    name: &'a str,
    latitude: f64,
    longitude: f64,
    price_per_gallon: f64,
    distance_along_route_miles: f64,
    gallons_purchased: f64,
    cost_usd: f64,
}

impl<'a> From<&'a FuelStopPlan> for StopReport<'a> {
    fn from(stop: &'a FuelStopPlan) -> Self {
        Self {
            station_id: &stop.station.station_id,
            name: &stop.station.name,
            latitude: stop.station.latitude,
            longitude: stop.station.longitude,
            price_per_gallon: stop.station.price_per_gallon,
            distance_along_route_miles: stop.distance_along_route_miles,
            gallons_purchased: stop.gallons_purchased,
            cost_usd: stop.cost_usd,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fuel_planner=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env()?;

    match args.command {
        Command::Plan {
            start_lat,
            start_lng,
            end_lat,
            end_lng,
            provider,
            osrm_url,
            range,
            mpg,
        } => {
            let vehicle = VehicleProfile::new(
                range.unwrap_or(config.vehicle_range_miles),
                mpg.unwrap_or(config.vehicle_mpg),
            )?;

            let provider: Box<dyn RouteProvider> = match provider {
                Provider::Ors => Box::new(OpenRouteClient::new(config.open_route())?),
                Provider::Osrm => Box::new(OsrmClient::new(OsrmConfig {
                    base_url: osrm_url,
                    timeout_secs: config.routing_timeout_secs,
                    ..OsrmConfig::default()
                })?),
            };

            let route = provider
                .route(
                    Coordinate::new(start_lat, start_lng),
                    Coordinate::new(end_lat, end_lng),
                )
                .context("fetching route")?;

            let cache = CatalogCache::new(config.catalog_source());
            let catalog = cache.get();
            let fuel_plan = plan(&catalog, &route, &vehicle, &config.corridor());

            let report = PlanReport {
                distance_miles: route.distance_miles,
                duration_seconds: route.duration_seconds,
                geometry: route.geometry.points(),
                fuel_stops: fuel_plan.stops.iter().map(StopReport::from).collect(),
                total_gallons: fuel_plan.total_gallons(),
                total_cost_usd: fuel_plan.total_cost_usd(),
                feasible: fuel_plan.is_feasible(),
                outcome: fuel_plan.outcome,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::DownloadCities { force } => {
            let dataset = CityDataset::ensure(&CityDatasetConfig {
                force,
                ..CityDatasetConfig::new(&config.cities_file)
            })?;
            match dataset.downloaded_bytes {
                Some(bytes) => println!("Saved {} bytes to {}", bytes, dataset.path.display()),
                None => println!("{} already present", dataset.path.display()),
            }
        }
    }

    Ok(())
}
