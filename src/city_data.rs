//! US cities dataset preparation (download once into the data directory).

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

/// kelvins/US-Cities-Database, MIT licensed.
pub const DEFAULT_CITIES_URL: &str =
    "https://raw.githubusercontent.com/kelvins/US-Cities-Database/main/csv/us_cities.csv";

const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct CityDatasetConfig {
    pub url: String,
    /// Destination file, e.g. `data/us_cities.csv`.
    pub dest: PathBuf,
    /// Download again even if `dest` exists.
    pub force: bool,
}

impl CityDatasetConfig {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self {
            url: DEFAULT_CITIES_URL.to_string(),
            dest: dest.into(),
            force: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CityDataset {
    pub path: PathBuf,
    /// Bytes written, or `None` when an existing file was reused.
    pub downloaded_bytes: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum CityDataError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl CityDataset {
    pub fn ensure(config: &CityDatasetConfig) -> Result<Self, CityDataError> {
        let dest = if config.dest.is_absolute() {
            config.dest.clone()
        } else {
            std::env::current_dir()?.join(&config.dest)
        };

        if dest.exists() && !config.force {
            return Ok(Self {
                path: dest,
                downloaded_bytes: None,
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = download(&config.url, &dest)?;
        info!(path = %dest.display(), bytes, "saved city table");

        Ok(Self {
            path: dest,
            downloaded_bytes: Some(bytes),
        })
    }
}

fn download(url: &str, dest: &Path) -> Result<usize, CityDataError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    let bytes = response.bytes()?;

    // A partial download never replaces `dest`.
    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    drop(writer);
    fs::rename(tmp_path, dest)?;
    Ok(bytes.len())
}
