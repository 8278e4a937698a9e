//! City/state → coordinate lookup used to place stations that only carry an address.
//!
//! Accepts both the simplemaps layout (`city, state_id, lat, lng`) and the
//! kelvins US-Cities-Database layout (`CITY, STATE_CODE, LATITUDE, LONGITUDE`).

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use crate::catalog::Columns;
use crate::haversine::Coordinate;

const CITY_COLUMNS: &[&str] = &["city", "City", "CITY"];
const STATE_COLUMNS: &[&str] = &["state_id", "STATE_CODE", "state", "State"];
const LAT_COLUMNS: &[&str] = &["lat", "Lat", "latitude", "LATITUDE"];
const LNG_COLUMNS: &[&str] = &["lng", "lon", "longitude", "LONGITUDE"];

/// Case-insensitive `(city, state)` table. The first row for a key wins.
#[derive(Debug, Clone, Default)]
pub struct CityLookup {
    coords: HashMap<(String, String), Coordinate>,
}

impl CityLookup {
    /// Loads the table from disk. A missing or unreadable file yields an empty table.
    pub fn load(path: &Path) -> Self {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "city table not available; run `fuel-planner download-cities`"
                );
                return Self::default();
            }
        };

        match Self::from_reader(file) {
            Ok(lookup) => {
                info!(cities = lookup.len(), path = %path.display(), "loaded city coordinates");
                lookup
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read city table");
                Self::default()
            }
        }
    }

    /// Parses a city CSV. Rows missing any field or with unparseable coordinates are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let columns = Columns::new(reader.headers()?);

        let mut coords = HashMap::new();
        for record in reader.records() {
            let Ok(record) = record else { continue };

            let (Some(city), Some(state), Some(lat), Some(lng)) = (
                columns.get(&record, CITY_COLUMNS),
                columns.get(&record, STATE_COLUMNS),
                columns.get(&record, LAT_COLUMNS),
                columns.get(&record, LNG_COLUMNS),
            ) else {
                continue;
            };
            let (Ok(lat), Ok(lng)) = (lat.parse::<f64>(), lng.parse::<f64>()) else {
                continue;
            };

            if let Entry::Vacant(slot) = coords.entry(key(city, state)) {
                slot.insert(Coordinate::new(lat, lng));
            }
        }

        Ok(Self { coords })
    }

    pub fn get(&self, city: &str, state: &str) -> Option<Coordinate> {
        self.coords.get(&key(city.trim(), state.trim())).copied()
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

fn key(city: &str, state: &str) -> (String, String) {
    (city.to_lowercase(), state.to_uppercase())
}
