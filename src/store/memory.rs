use crate::error::{Result, WeatherError};
use crate::models::Reading;
use crate::store::ReadingStore;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Reading store kept entirely in memory; contents are lost on drop.
#[derive(Default)]
pub struct MemoryReadingStore {
    readings: RwLock<HashMap<(String, i64), Reading>>,
    writes: AtomicUsize,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.readings.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReadingStore for MemoryReadingStore {
    fn get(&self, city: &str, hour: &DateTime<FixedOffset>) -> Result<Option<Reading>> {
        let readings = self
            .readings
            .read()
            .map_err(|_| WeatherError::Lock("memory store poisoned".to_string()))?;
        Ok(readings.get(&(city.to_string(), hour.timestamp())).cloned())
    }

    fn put(&self, reading: &Reading) -> Result<()> {
        let mut readings = self
            .readings
            .write()
            .map_err(|_| WeatherError::Lock("memory store poisoned".to_string()))?;

        let key = (reading.city.clone(), reading.hour_key());
        if readings.contains_key(&key) {
            return Err(WeatherError::Store(format!(
                "Reading already stored for {} at {}",
                reading.city, reading.timestamp
            )));
        }

        readings.insert(key, reading.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
