use crate::error::{Result, WeatherError};
use crate::models::CityProfile;
use std::collections::HashSet;
use std::path::Path;

/// Loads and checks city catalog documents.
#[derive(Debug, Default)]
pub struct CityReader;

impl CityReader {
    pub fn new() -> Self {
        Self
    }

    /// Read city profiles from a JSON catalog file
    pub fn read_cities(&self, path: &Path) -> Result<Vec<CityProfile>> {
        if !path.exists() {
            return Err(WeatherError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No such file or directory: {}", path.display()),
            )));
        }

        let json = std::fs::read_to_string(path)?;
        self.parse_cities(&json)
    }

    /// Parse city profiles from an in-memory JSON document
    pub fn parse_cities(&self, json: &str) -> Result<Vec<CityProfile>> {
        let cities: Vec<CityProfile> = serde_json::from_str(json)?;
        self.prepare(cities)
    }

    fn prepare(&self, mut cities: Vec<CityProfile>) -> Result<Vec<CityProfile>> {
        let mut codes = HashSet::with_capacity(cities.len());

        for city in &mut cities {
            city.sort_samples();

            city.check()?;

            if !codes.insert(city.code.to_ascii_uppercase()) {
                return Err(WeatherError::Catalog(format!(
                    "Duplicate city code in catalog: {}",
                    city.code
                )));
            }
        }

        tracing::debug!("Read {} cities from catalog", cities.len());
        Ok(cities)
    }
}
