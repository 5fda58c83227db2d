use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{Result, WeatherError};
use crate::utils::constants::LOCAL_TIME_FORMAT;

/// Drop minutes, seconds and sub-seconds, keeping the local hour.
///
/// The instant is moved back rather than rebuilt from local fields, so times
/// inside a repeated DST hour keep their own offset.
pub fn truncate_to_hour<Z: TimeZone>(time: &DateTime<Z>) -> Result<DateTime<Z>> {
    let past_hour = Duration::seconds(i64::from(time.minute() * 60 + time.second()))
        + Duration::nanoseconds(i64::from(time.nanosecond()));

    time.clone()
        .checked_sub_signed(past_hour)
        .ok_or_else(|| WeatherError::InvalidTime {
            input: time.naive_local().to_string(),
        })
}

/// Map a local wall-clock time onto an instant in `tz`.
///
/// Ambiguous times (DST fall back) resolve to the earliest instant and times
/// inside a DST gap are moved forward one hour.
pub fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Ok(t),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .ok_or_else(|| WeatherError::InvalidTime {
                input: naive.to_string(),
            }),
    }
}

/// Parse a user supplied time for a city.
///
/// `2015-04-02T17:00:00` is read as local time in `tz`; RFC 3339 input with an
/// offset is converted into `tz`. The result is truncated to the hour.
pub fn parse_city_time(input: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    let input = input.trim();

    let time = if let Ok(with_offset) = DateTime::parse_from_rfc3339(input) {
        with_offset.with_timezone(tz)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(input, LOCAL_TIME_FORMAT) {
        resolve_local(tz, naive)?
    } else {
        return Err(WeatherError::InvalidTime {
            input: input.to_string(),
        });
    };

    truncate_to_hour(&time)
}

/// The current hour in `tz`.
pub fn current_hour(tz: &Tz) -> Result<DateTime<Tz>> {
    truncate_to_hour(&Utc::now().with_timezone(tz))
}
