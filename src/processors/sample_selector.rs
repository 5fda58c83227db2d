use crate::error::{Result, WeatherError};
use crate::models::{CityProfile, SampleBucket};
use crate::utils::constants::{BUCKET_STEP_DAYS, FIRST_BUCKET_DAY};
use chrono::{DateTime, Datelike, TimeZone};

/// Maps a timestamp onto the city's sample bucket for that part of the month.
pub struct SampleSelector;

impl SampleSelector {
    /// Day of month anchoring the bucket that covers `day`: 1-9 map to 1,
    /// otherwise the day rounds down to a multiple of ten.
    pub fn bucket_day(day: u32) -> u32 {
        if day % BUCKET_STEP_DAYS == 0 {
            day
        } else if day / BUCKET_STEP_DAYS == 0 {
            FIRST_BUCKET_DAY
        } else {
            BUCKET_STEP_DAYS * (day / BUCKET_STEP_DAYS)
        }
    }

    /// Bucket for `timestamp`, matched on its local month and bucket day
    pub fn select_bucket<Z: TimeZone>(
        city: &CityProfile,
        timestamp: &DateTime<Z>,
    ) -> Result<SampleBucket> {
        let month = timestamp.month();
        let day = Self::bucket_day(timestamp.day());

        city.samples
            .iter()
            .find(|sample| sample.matches(month, day))
            .copied()
            .ok_or_else(|| WeatherError::SampleNotFound {
                city: city.code.clone(),
                month,
                day,
            })
    }
}
