use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Result, WeatherError};

/// Temperature template for the part of a month starting at `day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SampleBucket {
    #[validate(range(min = 1, max = 12))]
    pub month: u32,

    #[validate(range(min = 1, max = 31))]
    pub day: u32,

    pub min: i32,

    pub max: i32,
}

impl SampleBucket {
    pub fn new(month: u32, day: u32, min: i32, max: i32) -> Self {
        Self {
            month,
            day,
            min,
            max,
        }
    }

    pub fn matches(&self, month: u32, day: u32) -> bool {
        self.month == month && self.day == day
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CityProfile {
    #[validate(length(min = 1))]
    pub name: String,

    #[serde(alias = "iata_code")]
    #[validate(length(min = 1))]
    pub code: String,

    #[serde(alias = "iana_timezone")]
    #[validate(length(min = 1))]
    pub timezone: String,

    #[serde(alias = "sample_temps")]
    #[validate(nested)]
    pub samples: Vec<SampleBucket>,
}

impl CityProfile {
    pub fn new(name: &str, code: &str, timezone: &str, mut samples: Vec<SampleBucket>) -> Self {
        samples.sort_by_key(|s| (s.month, s.day));
        Self {
            name: name.to_string(),
            code: code.to_string(),
            timezone: timezone.to_string(),
            samples,
        }
    }

    /// IANA timezone of the city.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| WeatherError::UnknownTimezone(self.timezone.clone()))
    }

    /// Case-insensitive match on name or code.
    pub fn is_named(&self, name_or_code: &str) -> bool {
        self.code.eq_ignore_ascii_case(name_or_code) || self.name.eq_ignore_ascii_case(name_or_code)
    }

    pub fn sort_samples(&mut self) {
        self.samples.sort_by_key(|s| (s.month, s.day));
    }

    /// Field validation plus timezone resolution.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        self.tz()?;
        Ok(())
    }

    pub fn summary(&self) -> CitySummary {
        CitySummary {
            name: self.name.clone(),
            code: self.code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySummary {
    pub name: String,
    #[serde(rename = "iata_code")]
    pub code: String,
}
