use crate::error::{Result, WeatherError};
use crate::models::CalendarOffset;
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn duration_regex() -> &'static Regex {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    DURATION.get_or_init(|| {
        Regex::new(r"^(?:([0-9]+)Y)?(?:([0-9]+)M)?(?:([0-9]+)D)?$")
            .expect("duration pattern is valid")
    })
}

/// Parses offsets such as `1Y3M2D`, `1Y2M`, `3M2D` or `3D`.
pub struct DurationParser;

impl DurationParser {
    pub fn parse(text: &str) -> Result<CalendarOffset> {
        if text.is_empty() {
            return Err(WeatherError::InvalidDurationFormat(text.to_string()));
        }

        let captures = duration_regex()
            .captures(text)
            .ok_or_else(|| WeatherError::InvalidDurationFormat(text.to_string()))?;

        Ok(CalendarOffset {
            years: Self::component(&captures, 1, text)?,
            months: Self::component(&captures, 2, text)?,
            days: Self::component(&captures, 3, text)?,
        })
    }

    fn component(captures: &Captures<'_>, index: usize, text: &str) -> Result<u32> {
        match captures.get(index) {
            Some(digits) => digits
                .as_str()
                .parse::<u32>()
                .map_err(|_| WeatherError::InvalidDurationFormat(text.to_string())),
            None => Ok(0),
        }
    }
}
