use crate::error::{Result, WeatherError};
use crate::models::{CityProfile, Reading};
use crate::processors::key_lock::KeyLocks;
use crate::processors::SampleSelector;
use crate::store::{CityCatalog, ReadingStore};
use crate::utils::constants::{HIGH_SPREAD, LOW_SPREAD};
use crate::utils::time::truncate_to_hour;
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Produces the reading of a city at a given hour, generating it on first
/// request and returning the stored value on every later one.
pub struct TemperatureSynthesizer {
    catalog: Arc<dyn CityCatalog>,
    store: Arc<dyn ReadingStore>,
    rng: Mutex<StdRng>,
    locks: KeyLocks<(String, i64)>,
}

impl TemperatureSynthesizer {
    pub fn new(catalog: Arc<dyn CityCatalog>, store: Arc<dyn ReadingStore>) -> Self {
        Self {
            catalog,
            store,
            rng: Mutex::new(StdRng::from_entropy()),
            locks: KeyLocks::new(),
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn catalog(&self) -> &Arc<dyn CityCatalog> {
        &self.catalog
    }

    /// Reading for `city` at the hour containing `timestamp`.
    ///
    /// The timestamp is moved into the city's timezone before truncation, so
    /// the same instant always maps to the same stored reading.
    pub fn get<Z: TimeZone>(&self, city: &str, timestamp: &DateTime<Z>) -> Result<Reading> {
        self.get_batch(city, std::slice::from_ref(timestamp))?
            .pop()
            .ok_or_else(|| WeatherError::Store(format!("No reading produced for {}", city)))
    }

    /// Readings for `city` at the hours containing each of `timestamps`, in
    /// order.
    ///
    /// All hours of the batch are locked together and the readings generated
    /// for it reach the store in a single `put_all`. A failure anywhere in the
    /// batch stores nothing from it.
    pub fn get_batch<Z: TimeZone>(
        &self,
        city: &str,
        timestamps: &[DateTime<Z>],
    ) -> Result<Vec<Reading>> {
        let profile = self.catalog.lookup(city)?;
        let tz = profile.tz()?;
        let hours = timestamps
            .iter()
            .map(|t| truncate_to_hour(&t.with_timezone(&tz)))
            .collect::<Result<Vec<_>>>()?;

        // Keys are always taken in ascending order
        let mut keys: Vec<i64> = hours.iter().map(|h| h.timestamp()).collect();
        keys.sort_unstable();
        keys.dedup();
        let _guards = keys
            .into_iter()
            .map(|key| self.locks.acquire((profile.code.clone(), key)))
            .collect::<Result<Vec<_>>>()?;

        let mut readings = Vec::with_capacity(hours.len());
        let mut generated: Vec<Reading> = Vec::new();

        for hour in &hours {
            if let Some(fresh) = generated.iter().find(|r| r.hour_key() == hour.timestamp()) {
                readings.push(fresh.clone());
                continue;
            }

            if let Some(existing) = self.store.get(&profile.code, &hour.fixed_offset())? {
                tracing::trace!("Stored reading for {} at {}", profile.code, hour);
                readings.push(existing);
                continue;
            }

            let temperature = self.generate(&profile, hour)?;
            tracing::debug!(
                "Generated {}°C for {} at {}",
                temperature,
                profile.code,
                hour.to_rfc3339()
            );
            let reading = Reading::new(&profile.code, hour, temperature);
            generated.push(reading.clone());
            readings.push(reading);
        }

        if !generated.is_empty() {
            self.store.put_all(&generated)?;
        }
        Ok(readings)
    }

    /// Draw a temperature from the bucket covering `hour`, without storing it.
    ///
    /// The value lies in `[min - R1, max + R2 - 1]` with `R1` in `0..=1` and
    /// `R2` in `0..=2`.
    pub fn generate(&self, city: &CityProfile, hour: &DateTime<Tz>) -> Result<i32> {
        let bucket = SampleSelector::select_bucket(city, hour)?;
        let degenerate = || WeatherError::DegenerateRange {
            city: city.code.clone(),
            month: bucket.month,
            day: bucket.day,
            min: bucket.min,
            max: bucket.max,
        };

        if i64::from(bucket.max) - i64::from(bucket.min) < 1 {
            return Err(degenerate());
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| WeatherError::Lock("random generator poisoned".to_string()))?;

        let lo = i64::from(bucket.min) - i64::from(rng.gen_range(0..LOW_SPREAD));
        let hi = i64::from(bucket.max) + i64::from(rng.gen_range(0..HIGH_SPREAD));
        let diff = hi - lo;
        let value = lo + rng.gen_range(0..diff);

        i32::try_from(value).map_err(|_| degenerate())
    }
}
