use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

/// One synthesized temperature for a city at a whole hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub city: String,

    #[serde(rename = "time")]
    pub timestamp: DateTime<FixedOffset>,

    #[serde(rename = "temp")]
    pub temperature: i32,
}

impl Reading {
    pub fn new<Tz: TimeZone>(city: &str, timestamp: &DateTime<Tz>, temperature: i32) -> Self {
        Self {
            city: city.to_string(),
            timestamp: timestamp.fixed_offset(),
            temperature,
        }
    }

    /// Store key component: seconds since the epoch of the reading's hour.
    pub fn hour_key(&self) -> i64 {
        self.timestamp.timestamp()
    }
}

/// Readings over a date range with their folded statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeResult {
    pub readings: Vec<Reading>,
    pub min: i32,
    pub max: i32,
    pub average: i32,
}

impl RangeResult {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} readings: min={}°C, avg={}°C, max={}°C",
            self.readings.len(),
            self.min,
            self.average,
            self.max
        )
    }
}
