use crate::error::{Result, WeatherError};
use crate::models::{RangeResult, Reading};
use crate::processors::{DateRangeStreamer, TemperatureSynthesizer};
use crate::utils::progress::ProgressReporter;
use chrono::{DateTime, TimeZone};
use std::sync::Arc;

/// Running min / max / average folded one batch at a time.
///
/// Only the count and the exact sum are carried between batches, which makes
/// the result the count-weighted mean of the batch averages without any
/// floating point drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningStats {
    count: usize,
    min: i32,
    max: i32,
    sum: i64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, temps: &[i32]) {
        let Some((&first, rest)) = temps.split_first() else {
            return;
        };

        let (batch_min, batch_max, batch_sum) = rest.iter().fold(
            (first, first, i64::from(first)),
            |(lo, hi, sum), &t| (lo.min(t), hi.max(t), sum + i64::from(t)),
        );

        if self.count == 0 {
            self.min = batch_min;
            self.max = batch_max;
        } else {
            self.min = self.min.min(batch_min);
            self.max = self.max.max(batch_max);
        }

        self.sum += batch_sum;
        self.count += temps.len();
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min(&self) -> Option<i32> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<i32> {
        (self.count > 0).then_some(self.max)
    }

    /// Average truncated toward zero
    pub fn average(&self) -> Option<i32> {
        if self.count == 0 {
            return None;
        }
        i32::try_from(self.sum / self.count as i64).ok()
    }
}

/// Synthesizes the readings of a date range and folds them into statistics.
pub struct AggregationEngine {
    synthesizer: Arc<TemperatureSynthesizer>,
    streamer: DateRangeStreamer,
}

impl AggregationEngine {
    pub fn new(synthesizer: Arc<TemperatureSynthesizer>) -> Self {
        Self {
            synthesizer,
            streamer: DateRangeStreamer::new(),
        }
    }

    pub fn with_streamer(mut self, streamer: DateRangeStreamer) -> Self {
        self.streamer = streamer;
        self
    }

    /// Readings for every timestamp in `batches`, in order, plus their stats.
    ///
    /// The first failing timestamp aborts the whole aggregation.
    pub fn aggregate<I, Z>(
        &self,
        city: &str,
        batches: I,
        progress: Option<&ProgressReporter>,
    ) -> Result<RangeResult>
    where
        I: IntoIterator<Item = Result<Vec<DateTime<Z>>>>,
        Z: TimeZone,
    {
        let mut stats = RunningStats::new();
        let mut readings: Vec<Reading> = Vec::new();

        for batch in batches {
            let batch = batch?;
            let synthesized = self.synthesizer.get_batch(city, &batch)?;

            let temps: Vec<i32> = synthesized.iter().map(|r| r.temperature).collect();
            stats.merge(&temps);
            readings.extend(synthesized);

            if let Some(p) = progress {
                p.increment(temps.len() as u64);
            }
        }

        match (stats.min(), stats.max(), stats.average()) {
            (Some(min), Some(max), Some(average)) => {
                tracing::debug!(
                    "Aggregated {} readings for {}: min={}, max={}, avg={}",
                    stats.count(),
                    city,
                    min,
                    max,
                    average
                );
                Ok(RangeResult {
                    readings,
                    min,
                    max,
                    average,
                })
            }
            _ => Err(WeatherError::EmptyRange),
        }
    }

    /// Aggregate the period of `duration` ending at `end` for `city`.
    ///
    /// Days are produced on a separate thread and handed over one batch at a
    /// time; the producer is stopped whether or not aggregation succeeds.
    pub fn aggregate_period<Z: TimeZone>(
        &self,
        city: &str,
        end: &DateTime<Z>,
        duration: &str,
        progress: Option<&ProgressReporter>,
    ) -> Result<RangeResult> {
        let profile = self.synthesizer.catalog().lookup(city)?;
        let end = end.with_timezone(&profile.tz()?);

        let stream = self.streamer.stream(&end, duration)?.spawn()?;
        if let Some(p) = progress {
            p.set_length(stream.total_days());
        }

        self.aggregate(&profile.code, stream, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CityProfile, SampleBucket};
    use crate::store::{MemoryReadingStore, ReadingStore, StaticCityCatalog};
    use chrono_tz::Tz;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2015, 4, d, 12, 0, 0).unwrap()
    }

    fn engine_with(temps: &[(u32, i32)]) -> (AggregationEngine, Arc<MemoryReadingStore>) {
        let store = Arc::new(MemoryReadingStore::new());
        for &(d, t) in temps {
            store.put(&Reading::new("TST", &day(d), t)).unwrap();
        }

        let catalog = StaticCityCatalog::new(vec![CityProfile::new(
            "Testville",
            "TST",
            "UTC",
            vec![
                SampleBucket::new(4, 1, 10, 15),
                SampleBucket::new(4, 10, 10, 15),
                SampleBucket::new(4, 20, 10, 15),
                SampleBucket::new(4, 30, 10, 15),
            ],
        )]);
        let synth = TemperatureSynthesizer::new(Arc::new(catalog), store.clone()).with_seed(7);
        (AggregationEngine::new(Arc::new(synth)), store)
    }

    #[test]
    fn test_min_max_average() {
        let (engine, _) = engine_with(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
        let batch: Vec<DateTime<Tz>> = (1..=5).map(day).collect();

        let result = engine.aggregate("TST", vec![Ok(batch)], None).unwrap();
        assert_eq!((result.min, result.max, result.average), (1, 5, 3));
        let temps: Vec<i32> = result.readings.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_split_batches_same_average() {
        let temps = [(1, 3), (2, 8), (3, -2), (4, 11), (5, 7), (6, 4), (7, 9)];
        let (engine, _) = engine_with(&temps);
        let days: Vec<DateTime<Tz>> = (1..=7).map(day).collect();

        let whole = engine.aggregate("TST", vec![Ok(days.clone())], None).unwrap();
        let split = engine
            .aggregate(
                "TST",
                vec![Ok(days[..2].to_vec()), Ok(days[2..].to_vec())],
                None,
            )
            .unwrap();

        assert_eq!(whole, split);
        // 40 / 7 = 5.71
        assert_eq!(whole.average, 5);
    }

    #[test]
    fn test_single_timestamp() {
        let (engine, _) = engine_with(&[(9, 17)]);
        let result = engine.aggregate("TST", vec![Ok(vec![day(9)])], None).unwrap();
        assert_eq!((result.min, result.max, result.average), (17, 17, 17));
    }

    #[test]
    fn test_empty_range_is_an_error() {
        let (engine, _) = engine_with(&[]);
        let batches: Vec<Result<Vec<DateTime<Tz>>>> = vec![Ok(vec![])];
        assert!(matches!(
            engine.aggregate("TST", batches, None),
            Err(WeatherError::EmptyRange)
        ));
    }

    #[test]
    fn test_failure_aborts_aggregation() {
        let (engine, store) = engine_with(&[]);
        let may = Tz::UTC.with_ymd_and_hms(2015, 5, 2, 12, 0, 0).unwrap();
        let batches = vec![Ok(vec![day(28), day(29)]), Ok(vec![may, day(30)])];

        assert!(matches!(
            engine.aggregate("TST", batches, None),
            Err(WeatherError::SampleNotFound { month: 5, .. })
        ));
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_aggregate_period() {
        let (engine, store) = engine_with(&[]);
        let end = day(16);

        let result = engine.aggregate_period("testville", &end, "5D", None).unwrap();
        assert_eq!(result.len(), 6);
        assert_eq!(result.readings[0].timestamp, day(11).fixed_offset());
        assert!(result.readings.iter().all(|r| (9..=16).contains(&r.temperature)));
        assert!(result.min <= result.average && result.average <= result.max);
        assert_eq!(store.write_count(), 6);

        let again = engine.aggregate_period("TST", &end, "5D", None).unwrap();
        assert_eq!(again, result);
        assert_eq!(store.write_count(), 6);
    }

    #[test]
    fn test_running_stats_merge() {
        let mut whole = RunningStats::new();
        whole.merge(&[4, 8, 15, 16, 23, 42]);

        let mut split = RunningStats::new();
        split.merge(&[4, 8, 15]);
        split.merge(&[]);
        split.merge(&[16, 23, 42]);

        assert_eq!(whole.count(), 6);
        assert_eq!(whole.min(), split.min());
        assert_eq!(whole.max(), split.max());
        assert_eq!(whole.average(), split.average());
        assert_eq!(whole.average(), Some(18));
        assert_eq!(RunningStats::new().average(), None);
    }

    #[test]
    fn test_average_truncates_toward_zero() {
        let mut stats = RunningStats::new();
        stats.merge(&[1, 2]);
        assert_eq!(stats.average(), Some(1));

        let mut cold = RunningStats::new();
        cold.merge(&[-1, -2]);
        cold.merge(&[-2]);
        assert_eq!(cold.average(), Some(-1));
        assert_eq!((cold.min(), cold.max()), (Some(-2), Some(-1)));

        let mut exact = RunningStats::new();
        exact.merge(&[3, 0, 0]);
        exact.merge(&[0, 3, 0]);
        exact.merge(&[0, 0, 3]);
        assert_eq!(exact.average(), Some(1));
    }

    #[test]
    fn test_period_across_dst_fall_back() {
        let catalog = StaticCityCatalog::new(vec![CityProfile::new(
            "New York",
            "NYC",
            "America/New_York",
            vec![
                SampleBucket::new(10, 20, 8, 16),
                SampleBucket::new(10, 30, 6, 14),
                SampleBucket::new(11, 1, 5, 12),
            ],
        )]);
        let store = Arc::new(MemoryReadingStore::new());
        let synth = TemperatureSynthesizer::new(Arc::new(catalog), store.clone()).with_seed(11);
        let engine = AggregationEngine::new(Arc::new(synth));

        let end = chrono_tz::America::New_York
            .with_ymd_and_hms(2015, 11, 5, 1, 0, 0)
            .unwrap();
        let result = engine.aggregate_period("NYC", &end, "10D", None).unwrap();

        assert_eq!(result.len(), 11);
        let stamps: Vec<String> = result.readings.iter().map(|r| r.timestamp.to_rfc3339()).collect();
        assert_eq!(stamps[0], "2015-10-26T01:00:00-04:00");
        assert!(stamps.contains(&"2015-11-01T01:00:00-04:00".to_string()));
        assert_eq!(stamps[10], "2015-11-05T01:00:00-05:00");
        assert_eq!(store.write_count(), 11);
    }
}
