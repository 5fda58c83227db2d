use crate::error::{Result, WeatherError};
use crate::models::{CityProfile, CitySummary};
use crate::readers::CityReader;
use crate::store::CityCatalog;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

type Cities = Arc<Vec<Arc<CityProfile>>>;

fn find(cities: &[Arc<CityProfile>], name_or_code: &str) -> Option<Arc<CityProfile>> {
    cities.iter().find(|c| c.is_named(name_or_code)).cloned()
}

fn summaries(cities: &[Arc<CityProfile>]) -> Vec<CitySummary> {
    let mut list: Vec<CitySummary> = cities.iter().map(|c| c.summary()).collect();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    list
}

/// Catalog backed by a JSON file, parsed on first use and cached.
///
/// A lookup miss reloads the file once before reporting `CityNotFound`, so
/// cities added to the file are picked up without a restart.
pub struct FileCityCatalog {
    path: PathBuf,
    reader: CityReader,
    cache: RwLock<Option<Cities>>,
}

impl FileCityCatalog {
    /// The catalog file must exist.
    pub fn new(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WeatherError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No such file or directory: {}", path.display()),
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            reader: CityReader::new(),
            cache: RwLock::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop the cache and parse the file again
    pub fn reload(&self) -> Result<Cities> {
        let cities: Cities = Arc::new(
            self.reader
                .read_cities(&self.path)?
                .into_iter()
                .map(Arc::new)
                .collect(),
        );

        let mut cache = self
            .cache
            .write()
            .map_err(|_| WeatherError::Lock("city catalog cache poisoned".to_string()))?;
        *cache = Some(cities.clone());

        tracing::debug!("Loaded {} cities from {}", cities.len(), self.path.display());
        Ok(cities)
    }

    fn loaded(&self) -> Result<Cities> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| WeatherError::Lock("city catalog cache poisoned".to_string()))?;
            if let Some(cities) = cache.as_ref() {
                return Ok(cities.clone());
            }
        }
        self.reload()
    }
}

impl CityCatalog for FileCityCatalog {
    fn lookup(&self, name_or_code: &str) -> Result<Arc<CityProfile>> {
        if let Some(city) = find(&self.loaded()?, name_or_code) {
            return Ok(city);
        }

        tracing::warn!(
            "City '{}' not in cached catalog, reloading {}",
            name_or_code,
            self.path.display()
        );
        find(&self.reload()?, name_or_code)
            .ok_or_else(|| WeatherError::CityNotFound(name_or_code.to_string()))
    }

    fn cities(&self) -> Result<Vec<CitySummary>> {
        Ok(summaries(&self.loaded()?))
    }
}

/// Catalog over a fixed, in-memory list of cities
pub struct StaticCityCatalog {
    cities: Vec<Arc<CityProfile>>,
}

impl StaticCityCatalog {
    pub fn new(cities: Vec<CityProfile>) -> Self {
        Self {
            cities: cities
                .into_iter()
                .map(|mut city| {
                    city.sort_samples();
                    Arc::new(city)
                })
                .collect(),
        }
    }
}

impl CityCatalog for StaticCityCatalog {
    fn lookup(&self, name_or_code: &str) -> Result<Arc<CityProfile>> {
        find(&self.cities, name_or_code)
            .ok_or_else(|| WeatherError::CityNotFound(name_or_code.to_string()))
    }

    fn cities(&self) -> Result<Vec<CitySummary>> {
        Ok(summaries(&self.cities))
    }
}
