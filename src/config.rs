//! Runtime settings.
//!
//! Built-in defaults are overridden by an optional `weather-station.toml` (or
//! the file given with `--config`), which is in turn overridden by
//! `WEATHER_STATION_*` environment variables.

use crate::error::Result;
use crate::utils::constants::{
    CITIES_FILE, CONFIG_FILE, DEFAULT_BATCH_SIZE, DEFAULT_CITY, DEFAULT_DATA_DIR, ENV_PREFIX,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Directory holding the city catalog and per-city reading files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Catalog file, relative to `data_dir` unless absolute
    #[serde(default = "default_cities_file")]
    pub cities_file: PathBuf,

    #[serde(default = "default_city")]
    #[validate(length(min = 1))]
    pub default_city: String,

    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1))]
    pub batch_size: usize,

    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_cities_file() -> PathBuf {
    PathBuf::from(CITIES_FILE)
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cities_file: default_cities_file(),
            default_city: default_city(),
            batch_size: default_batch_size(),
            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from the layered sources.
    ///
    /// An explicit `config_file` must exist; the implicit
    /// `weather-station.toml` is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(
            config_file,
            Environment::with_prefix(ENV_PREFIX).try_parsing(true),
        )
    }

    fn load_with_env(config_file: Option<&Path>, env: Environment) -> Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn cities_path(&self) -> PathBuf {
        if self.cities_file.is_absolute() {
            self.cities_file.clone()
        } else {
            self.data_dir.join(&self.cities_file)
        }
    }
}
