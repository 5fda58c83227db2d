use crate::error::{Result, WeatherError};
use crate::models::Reading;
use crate::store::ReadingStore;
use crate::utils::constants::READINGS_FILE_EXTENSION;
use chrono::{DateTime, FixedOffset};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

type CityReadings = BTreeMap<i64, Reading>;

/// Reading store persisting one `<CODE>.json` file per city.
///
/// A city's file is read the first time the city is touched and kept in
/// memory afterwards. Each `put` rewrites the whole file through a temporary
/// file in the same directory, so a crash never leaves a truncated file.
pub struct JsonReadingStore {
    dir: PathBuf,
    cities: Mutex<HashMap<String, CityReadings>>,
}

impl JsonReadingStore {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            cities: Mutex::new(HashMap::new()),
        })
    }

    /// File holding the readings of `city`
    pub fn city_file(&self, city: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", city, READINGS_FILE_EXTENSION))
    }

    fn load(&self, city: &str) -> Result<CityReadings> {
        let path = self.city_file(city);
        if !path.exists() || std::fs::metadata(&path)?.len() == 0 {
            return Ok(CityReadings::new());
        }

        let readings: Vec<Reading> = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
        tracing::debug!("Loaded {} readings from {}", readings.len(), path.display());

        Ok(readings.into_iter().map(|r| (r.hour_key(), r)).collect())
    }

    fn save(&self, city: &str, readings: &CityReadings) -> Result<()> {
        let path = self.city_file(city);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, &readings.values().collect::<Vec<_>>())?;
            writer.flush()?;
        }
        tmp.persist(&path)?;
        Ok(())
    }

    fn with_city<T>(&self, city: &str, f: impl FnOnce(&mut CityReadings) -> Result<T>) -> Result<T> {
        let mut cities = self
            .cities
            .lock()
            .map_err(|_| WeatherError::Lock("json store poisoned".to_string()))?;

        if !cities.contains_key(city) {
            let loaded = self.load(city)?;
            cities.insert(city.to_string(), loaded);
        }

        match cities.get_mut(city) {
            Some(readings) => f(readings),
            None => Err(WeatherError::Store(format!("No readings loaded for {}", city))),
        }
    }
}

impl ReadingStore for JsonReadingStore {
    fn get(&self, city: &str, hour: &DateTime<FixedOffset>) -> Result<Option<Reading>> {
        self.with_city(city, |readings| Ok(readings.get(&hour.timestamp()).cloned()))
    }

    fn put(&self, reading: &Reading) -> Result<()> {
        self.put_all(std::slice::from_ref(reading))
    }

    /// One file rewrite per city, whatever the number of readings
    fn put_all(&self, readings: &[Reading]) -> Result<()> {
        let mut by_city: BTreeMap<&str, Vec<&Reading>> = BTreeMap::new();
        for reading in readings {
            by_city.entry(reading.city.as_str()).or_default().push(reading);
        }

        for (city, batch) in by_city {
            self.with_city(city, |stored| {
                let mut added = Vec::with_capacity(batch.len());
                for reading in &batch {
                    let key = reading.hour_key();
                    if stored.contains_key(&key) {
                        for key in &added {
                            stored.remove(key);
                        }
                        return Err(WeatherError::Store(format!(
                            "Reading already stored for {} at {}",
                            reading.city, reading.timestamp
                        )));
                    }
                    stored.insert(key, (*reading).clone());
                    added.push(key);
                }

                if let Err(e) = self.save(city, stored) {
                    for key in &added {
                        stored.remove(key);
                    }
                    return Err(e);
                }
                tracing::trace!("Saved {} new readings for {}", added.len(), city);
                Ok(())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Paris;
    use tempfile::TempDir;

    #[test]
    fn test_readings_survive_restart() -> Result<()> {
        let dir = TempDir::new()?;
        let at = Paris.with_ymd_and_hms(2013, 4, 16, 10, 0, 0).unwrap();

        {
            let store = JsonReadingStore::new(dir.path())?;
            store.put(&Reading::new("PAR", &at, 14))?;
            assert!(store.city_file("PAR").exists());
        }

        let reopened = JsonReadingStore::new(dir.path())?;
        let reading = reopened.get("PAR", &at.fixed_offset())?.unwrap();
        assert_eq!(reading.temperature, 14);
        assert_eq!(reading.timestamp.to_rfc3339(), "2013-04-16T10:00:00+02:00");

        Ok(())
    }

    #[test]
    fn test_file_is_json_array_sorted_by_time() -> Result<()> {
        let dir = TempDir::new()?;
        let store = JsonReadingStore::new(dir.path())?;
        let later = Paris.with_ymd_and_hms(2013, 4, 17, 10, 0, 0).unwrap();
        let earlier = Paris.with_ymd_and_hms(2013, 4, 16, 10, 0, 0).unwrap();

        store.put(&Reading::new("PAR", &later, 15))?;
        store.put(&Reading::new("PAR", &earlier, 14))?;

        let raw = std::fs::read_to_string(store.city_file("PAR"))?;
        let on_disk: Vec<Reading> = serde_json::from_str(&raw)?;
        let temps: Vec<i32> = on_disk.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![14, 15]);

        Ok(())
    }

    #[test]
    fn test_empty_file_is_empty_store() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("DKR.json"), "")?;
        let store = JsonReadingStore::new(dir.path())?;
        let at = Paris.with_ymd_and_hms(2013, 4, 16, 10, 0, 0).unwrap();

        assert!(store.get("DKR", &at.fixed_offset())?.is_none());
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_reported() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("DKR.json"), "{not json")?;
        let store = JsonReadingStore::new(dir.path())?;
        let at = Paris.with_ymd_and_hms(2013, 4, 16, 10, 0, 0).unwrap();

        assert!(matches!(
            store.get("DKR", &at.fixed_offset()),
            Err(WeatherError::Json(_))
        ));
        Ok(())
    }

    #[test]
    fn test_put_all_writes_every_reading() -> Result<()> {
        let dir = TempDir::new()?;
        let store = JsonReadingStore::new(dir.path())?;
        let readings: Vec<Reading> = (16..19)
            .map(|d| {
                let at = Paris.with_ymd_and_hms(2013, 4, d, 10, 0, 0).unwrap();
                Reading::new("PAR", &at, d as i32)
            })
            .collect();

        store.put_all(&readings)?;

        let reopened = JsonReadingStore::new(dir.path())?;
        for reading in &readings {
            assert_eq!(reopened.get("PAR", &reading.timestamp)?.as_ref(), Some(reading));
        }
        Ok(())
    }

    #[test]
    fn test_put_all_with_stored_hour_changes_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let store = JsonReadingStore::new(dir.path())?;
        let first = Paris.with_ymd_and_hms(2013, 4, 16, 10, 0, 0).unwrap();
        let second = Paris.with_ymd_and_hms(2013, 4, 17, 10, 0, 0).unwrap();
        store.put(&Reading::new("PAR", &second, 15))?;
        let before = std::fs::read_to_string(store.city_file("PAR"))?;

        let batch = [Reading::new("PAR", &first, 14), Reading::new("PAR", &second, 30)];
        assert!(matches!(store.put_all(&batch), Err(WeatherError::Store(_))));

        assert!(store.get("PAR", &first.fixed_offset())?.is_none());
        assert_eq!(store.get("PAR", &second.fixed_offset())?.unwrap().temperature, 15);
        assert_eq!(std::fs::read_to_string(store.city_file("PAR"))?, before);
        Ok(())
    }
}
