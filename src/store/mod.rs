//! Collaborators consumed by the synthesis engine.
//!
//! The engine only needs two narrow contracts: a city catalog that resolves a
//! name or code to a [`CityProfile`], and a reading store that gets and puts
//! readings keyed by city code and hour. Any backend satisfying them can be
//! plugged into [`crate::processors::TemperatureSynthesizer`].

use crate::error::Result;
use crate::models::{CityProfile, CitySummary, Reading};
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;

pub mod catalog;
pub mod json_store;
pub mod memory;

pub use catalog::{FileCityCatalog, StaticCityCatalog};
pub use json_store::JsonReadingStore;
pub use memory::MemoryReadingStore;

/// Port for resolving cities
pub trait CityCatalog: Send + Sync {
    /// Case-insensitive lookup on the city's name or code
    fn lookup(&self, name_or_code: &str) -> Result<Arc<CityProfile>>;

    /// All cities, sorted by name
    fn cities(&self) -> Result<Vec<CitySummary>>;
}

/// Port for persisting readings
///
/// Readings are keyed by the canonical city code and the reading's hour. An
/// implementation never has to handle concurrent writers for the same key:
/// the synthesizer serialises them.
pub trait ReadingStore: Send + Sync {
    /// Reading stored for `city` at `hour`, if any
    fn get(&self, city: &str, hour: &DateTime<FixedOffset>) -> Result<Option<Reading>>;

    /// Persist a new reading
    fn put(&self, reading: &Reading) -> Result<()>;

    /// Persist several new readings. Backends that pay per write override
    /// this to write once.
    fn put_all(&self, readings: &[Reading]) -> Result<()> {
        readings.iter().try_for_each(|reading| self.put(reading))
    }
}
