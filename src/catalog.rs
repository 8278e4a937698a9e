//! Fuel station catalog.
//!
//! Stations are read from a price CSV whose column names vary by vendor
//! (OPIS truckstop exports as well as generic `id, name, lat, lon, price`
//! files). Each logical field is looked up through an ordered list of
//! column aliases. Rows without a usable price or location are skipped.
//!
//! The catalog is loaded once and shared read-only; [`CatalogCache`] owns
//! that single load and lets callers drop it when the price file changes.

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cities::CityLookup;
use crate::haversine::Coordinate;
use crate::spatial::SpatialIndex;

const ID_COLUMNS: &[&str] = &["OPIS Truckstop ID", "station_id", "id", "StationId"];
const NAME_COLUMNS: &[&str] = &["Truckstop Name", "name", "Name"];
const PRICE_COLUMNS: &[&str] = &["Retail Price", "price", "price_per_gallon", "Price"];
const LAT_COLUMNS: &[&str] = &["lat", "latitude", "Lat", "Latitude"];
const LNG_COLUMNS: &[&str] = &["lon", "lng", "longitude", "Lon", "Longitude"];
const CITY_COLUMNS: &[&str] = &["City", "city"];
const STATE_COLUMNS: &[&str] = &["State", "state"];

const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelStation {
    pub station_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_gallon: f64,
}

impl FuelStation {
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Where the catalog comes from.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    /// Fuel price CSV.
    pub fuel_price_file: PathBuf,
    /// City table used when a row has no coordinates of its own.
    pub cities_file: Option<PathBuf>,
}

impl CatalogSource {
    pub fn new(fuel_price_file: impl Into<PathBuf>) -> Self {
        Self {
            fuel_price_file: fuel_price_file.into(),
            cities_file: None,
        }
    }

    pub fn with_cities(mut self, cities_file: impl Into<PathBuf>) -> Self {
        self.cities_file = Some(cities_file.into());
        self
    }
}

/// An immutable station collection plus its spatial index.
///
/// Station positions in [`Catalog::stations`] are the indices returned by
/// the spatial index queries.
#[derive(Debug, Default)]
pub struct Catalog {
    stations: Vec<FuelStation>,
    index: OnceLock<SpatialIndex>,
}

impl Catalog {
    pub fn new(stations: Vec<FuelStation>) -> Self {
        Self {
            stations,
            index: OnceLock::new(),
        }
    }

    pub fn stations(&self) -> &[FuelStation] {
        &self.stations
    }

    pub fn get(&self, index: usize) -> Option<&FuelStation> {
        self.stations.get(index)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// The spatial index, built on first use.
    pub fn spatial_index(&self) -> &SpatialIndex {
        self.index.get_or_init(|| SpatialIndex::build(&self.stations))
    }
}

/// Loads the catalog described by `source`.
///
/// Never fails: a missing price file yields an empty catalog so planning
/// degrades to "no stops available".
pub fn load_catalog(source: &CatalogSource) -> Catalog {
    let cities = source
        .cities_file
        .as_deref()
        .map(CityLookup::load)
        .unwrap_or_default();

    let file = match std::fs::File::open(&source.fuel_price_file) {
        Ok(file) => file,
        Err(err) => {
            warn!(
                path = %source.fuel_price_file.display(),
                error = %err,
                "fuel price file not available"
            );
            return Catalog::default();
        }
    };

    match parse_stations(file, &cities) {
        Ok(stations) => {
            info!(stations = stations.len(), "loaded fuel stations");
            Catalog::new(stations)
        }
        Err(err) => {
            warn!(
                path = %source.fuel_price_file.display(),
                error = %err,
                "failed to read fuel price header"
            );
            Catalog::default()
        }
    }
}

/// Parses a fuel price CSV, preserving row order.
///
/// Only an unreadable header is an error; bad rows are counted and skipped.
pub fn parse_stations<R: Read>(
    reader: R,
    cities: &CityLookup,
) -> Result<Vec<FuelStation>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::new(reader.headers()?);

    let mut stations = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        match record.ok().and_then(|r| parse_row(&columns, &r, cities)) {
            Some(station) => stations.push(station),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped fuel price rows missing price or coordinates");
    }
    Ok(stations)
}

fn parse_row(
    columns: &Columns,
    record: &csv::StringRecord,
    cities: &CityLookup,
) -> Option<FuelStation> {
    let price = columns
        .get(record, PRICE_COLUMNS)?
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)?;

    let location = direct_location(columns, record).or_else(|| {
        let city = columns.get(record, CITY_COLUMNS)?;
        let state = columns.get(record, STATE_COLUMNS)?;
        let found = cities.get(city, state);
        if found.is_none() {
            debug!(city, state, "no coordinates for city");
        }
        found
    })?;

    Some(FuelStation {
        station_id: columns.get(record, ID_COLUMNS).unwrap_or_default().to_string(),
        name: columns
            .get(record, NAME_COLUMNS)
            .unwrap_or(UNKNOWN_NAME)
            .to_string(),
        latitude: location.lat,
        longitude: location.lng,
        price_per_gallon: price,
    })
}

fn direct_location(columns: &Columns, record: &csv::StringRecord) -> Option<Coordinate> {
    let lat = columns.get(record, LAT_COLUMNS)?.parse::<f64>().ok()?;
    let lng = columns.get(record, LNG_COLUMNS)?.parse::<f64>().ok()?;
    Some(Coordinate::new(lat, lng))
}

/// Header name → column position, queried through alias lists.
///
/// A header name repeated in the file resolves to its last column.
#[derive(Debug, Clone)]
pub(crate) struct Columns {
    positions: HashMap<String, usize>,
}

impl Columns {
    pub(crate) fn new(headers: &csv::StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        Self { positions }
    }

    /// First alias whose column exists and holds a non-empty value.
    pub(crate) fn get<'r>(&self, record: &'r csv::StringRecord, aliases: &[&str]) -> Option<&'r str> {
        aliases
            .iter()
            .filter_map(|alias| self.positions.get(*alias))
            .filter_map(|&i| record.get(i))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}

/// Owns the process-wide catalog and loads it at most once.
///
/// Concurrent first callers block on the write lock; exactly one of them
/// reads the source. Later calls share the same `Arc` until
/// [`CatalogCache::invalidate`] drops it.
#[derive(Debug)]
pub struct CatalogCache {
    source: CatalogSource,
    slot: RwLock<Option<Arc<Catalog>>>,
}

impl CatalogCache {
    pub fn new(source: CatalogSource) -> Self {
        Self {
            source,
            slot: RwLock::new(None),
        }
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Returns the cached catalog, loading it on first call.
    pub fn get(&self) -> Arc<Catalog> {
        if let Some(catalog) = self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(catalog);
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded it while we waited for the lock.
        if let Some(catalog) = slot.as_ref() {
            return Arc::clone(catalog);
        }
        let catalog = Arc::new(load_catalog(&self.source));
        *slot = Some(Arc::clone(&catalog));
        catalog
    }

    /// Drops the cached catalog; the next [`get`](Self::get) reloads it.
    ///
    /// Callers still holding the old `Arc` keep a consistent snapshot.
    pub fn invalidate(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Invalidates and immediately reloads.
    pub fn reload(&self) -> Arc<Catalog> {
        self.invalidate();
        self.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> CityLookup {
        let csv = "city,state_id,lat,lng\n\
                   Amarillo,TX,35.2220,-101.8313\n\
                   Gallup,NM,35.5281,-108.7426\n";
        CityLookup::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_parses_opis_rows_through_city_lookup() {
        let csv = "OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price\n\
                   7,LOVES TRAVEL STOP #123,I-40 EXIT 72,Amarillo,TX,300,3.459\n\
                   8,PILOT #456,I-40 EXIT 20,Gallup,NM,301,3.899\n";
        let stations = parse_stations(csv.as_bytes(), &cities()).unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].station_id, "7");
        assert_eq!(stations[0].name, "LOVES TRAVEL STOP #123");
        assert_eq!(stations[0].latitude, 35.2220);
        assert_eq!(stations[0].longitude, -101.8313);
        assert_eq!(stations[0].price_per_gallon, 3.459);
        assert_eq!(stations[1].station_id, "8");
    }

    #[test]
    fn test_parses_generic_rows_with_coordinates() {
        let csv = "id,name,lat,lng,price_per_gallon\n\
                   a,Alpha,35.0,-100.0,3.10\n\
                   b,Beta,35.5,-101.0,2.95\n";
        let stations = parse_stations(csv.as_bytes(), &CityLookup::default()).unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[1].name, "Beta");
        assert_eq!(stations[1].location(), Coordinate::new(35.5, -101.0));
    }

    #[test]
    fn test_earlier_alias_takes_priority() {
        let csv = "station_id,id,name,latitude,lon,price,Price\n\
                   primary,secondary,Gamma,36.0,-102.0,3.00,9.99\n";
        let stations = parse_stations(csv.as_bytes(), &CityLookup::default()).unwrap();
        assert_eq!(stations[0].station_id, "primary");
        assert_eq!(stations[0].price_per_gallon, 3.00);
    }

    #[test]
    fn test_empty_alias_falls_through_to_next() {
        let csv = "Retail Price,price,name,lat,lon\n,3.25,Delta,36.0,-102.0\n";
        let stations = parse_stations(csv.as_bytes(), &CityLookup::default()).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].price_per_gallon, 3.25);
    }

    #[test]
    fn test_duplicate_header_reads_last_column() {
        let csv = "id,name,lat,lon,price,price\n\
                   1,Echo,36.0,-102.0,9.99,3.15\n";
        let stations = parse_stations(csv.as_bytes(), &CityLookup::default()).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].price_per_gallon, 3.15);
    }

    #[test]
    fn test_missing_name_and_id_get_defaults() {
        let csv = "lat,lon,price\n36.0,-102.0,3.00\n";
        let stations = parse_stations(csv.as_bytes(), &CityLookup::default()).unwrap();
        assert_eq!(stations[0].station_id, "");
        assert_eq!(stations[0].name, "Unknown");
    }

    #[test]
    fn test_bad_direct_coordinates_fall_back_to_city() {
        let csv = "id,lat,lon,City,State,price\n1,n/a,-101.0,Amarillo,TX,3.30\n";
        let stations = parse_stations(csv.as_bytes(), &cities()).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].latitude, 35.2220);
    }

    #[test]
    fn test_skips_rows_without_price_or_location() {
        let csv = "id,name,lat,lon,City,State,price\n\
                   1,NoPrice,35.0,-100.0,,,\n\
                   2,BadPrice,35.0,-100.0,,,cheap\n\
                   3,NegativePrice,35.0,-100.0,,,-1.0\n\
                   4,NoCoords,,,,,3.00\n\
                   5,UnknownCity,,,Nowhere,ZZ,3.00\n\
                   6,Good,35.0,-100.0,,,3.00\n";
        let stations = parse_stations(csv.as_bytes(), &cities()).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].station_id, "6");
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let csv = "id,name,lat,lon,price\n\
                   dup,First,35.0,-100.0,3.00\n\
                   dup,Second,35.1,-100.1,3.10\n";
        let stations = parse_stations(csv.as_bytes(), &CityLookup::default()).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].name, "First");
        assert_eq!(stations[1].name, "Second");
    }

    #[test]
    fn test_missing_source_is_empty_catalog() {
        let catalog = load_catalog(&CatalogSource::new("/nonexistent/fuel_prices.csv"));
        assert!(catalog.is_empty());
        assert!(catalog.spatial_index().is_empty());
    }

    #[test]
    fn test_spatial_index_is_built_once() {
        let catalog = Catalog::new(vec![FuelStation {
            station_id: "1".into(),
            name: "Only".into(),
            latitude: 35.0,
            longitude: -100.0,
            price_per_gallon: 3.0,
        }]);
        let first = catalog.spatial_index() as *const SpatialIndex;
        let second = catalog.spatial_index() as *const SpatialIndex;
        assert_eq!(first, second);
        assert_eq!(catalog.spatial_index().len(), 1);
    }
}
