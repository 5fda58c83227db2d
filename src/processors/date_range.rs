use crate::error::{Result, WeatherError};
use crate::models::CalendarOffset;
use crate::processors::DurationParser;
use crate::utils::constants::DEFAULT_BATCH_SIZE;
use crate::utils::time::resolve_local;
use chrono::{DateTime, Days, Months, NaiveDateTime};
use chrono_tz::Tz;
use crossbeam::channel::{bounded, Receiver};
use std::thread::JoinHandle;

pub type DateBatch = Vec<DateTime<Tz>>;

/// Produces the days of a period ending at a given timestamp.
pub struct DateRangeStreamer {
    batch_size: usize,
}

impl DateRangeStreamer {
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Days from `end - duration` to `end` inclusive, one calendar day apart.
    ///
    /// Expects durations like `1Y3M2D`, `1Y2M`, `3M2D` or `3D`.
    pub fn stream(&self, end: &DateTime<Tz>, duration: &str) -> Result<DateBatches> {
        let offset = DurationParser::parse(duration)?;
        self.stream_offset(end, &offset)
    }

    pub fn stream_offset(
        &self,
        end: &DateTime<Tz>,
        offset: &CalendarOffset,
    ) -> Result<DateBatches> {
        let start = Self::start_of(end, offset)?;
        let total = (end.date_naive() - start.date()).num_days() + 1;

        tracing::debug!(
            "Streaming {} days from {} to {} in batches of {}",
            total,
            start,
            end.naive_local(),
            self.batch_size
        );

        Ok(DateBatches {
            tz: end.timezone(),
            start,
            next: 0,
            total: u64::try_from(total).unwrap_or(0),
            batch_size: self.batch_size,
        })
    }

    /// Local wall-clock time `offset` before `end`.
    ///
    /// Years, then months, then days are subtracted; a month end that does
    /// not exist in the target month clamps to that month's last day.
    pub fn start_of(end: &DateTime<Tz>, offset: &CalendarOffset) -> Result<NaiveDateTime> {
        let out_of_range = || WeatherError::InvalidTime {
            input: format!("{} before {}", offset, end.to_rfc3339()),
        };

        let years_in_months = offset.years.checked_mul(12).ok_or_else(out_of_range)?;

        end.naive_local()
            .checked_sub_months(Months::new(years_in_months))
            .and_then(|t| t.checked_sub_months(Months::new(offset.months)))
            .and_then(|t| t.checked_sub_days(Days::new(u64::from(offset.days))))
            .ok_or_else(out_of_range)
    }
}

impl Default for DateRangeStreamer {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward-only sequence of day batches.
///
/// Each call to `next` computes the following batch only, so a long period
/// never sits in memory as a whole.
pub struct DateBatches {
    tz: Tz,
    start: NaiveDateTime,
    next: u64,
    total: u64,
    batch_size: usize,
}

impl DateBatches {
    /// Number of days the full sequence yields
    pub fn total_days(&self) -> u64 {
        self.total
    }

    fn day(&self, index: u64) -> Result<DateTime<Tz>> {
        let local = self
            .start
            .checked_add_days(Days::new(index))
            .ok_or_else(|| WeatherError::InvalidTime {
                input: format!("{} + {} days", self.start, index),
            })?;
        resolve_local(&self.tz, local)
    }

    /// Move production onto a producer thread handing batches over a
    /// channel that holds a single batch.
    pub fn spawn(self) -> Result<BatchStream> {
        let total = self.total;
        let (sender, receiver) = bounded::<Result<DateBatch>>(1);

        let producer = std::thread::Builder::new()
            .name("date-range-producer".to_string())
            .spawn(move || {
                for batch in self {
                    let failed = batch.is_err();
                    if sender.send(batch).is_err() {
                        tracing::debug!("Date range consumer went away, stopping producer");
                        return;
                    }
                    if failed {
                        return;
                    }
                }
            })?;

        Ok(BatchStream {
            receiver: Some(receiver),
            producer: Some(producer),
            total,
        })
    }
}

impl Iterator for DateBatches {
    type Item = Result<DateBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }

        let end = self.total.min(self.next + self.batch_size as u64);
        let batch: Result<DateBatch> = (self.next..end).map(|i| self.day(i)).collect();
        self.next = end;
        Some(batch)
    }
}

/// Receiving side of a spawned [`DateBatches`] producer.
///
/// Dropping the stream, or calling [`BatchStream::cancel`], disconnects the
/// channel and joins the producer, so a stream abandoned half way does not
/// leave a thread blocked on a send.
pub struct BatchStream {
    receiver: Option<Receiver<Result<DateBatch>>>,
    producer: Option<JoinHandle<()>>,
    total: u64,
}

impl BatchStream {
    pub fn total_days(&self) -> u64 {
        self.total
    }

    /// Stop the producer and wait for it to exit
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.receiver.take();
        if let Some(producer) = self.producer.take() {
            if producer.join().is_err() {
                tracing::warn!("Date range producer panicked");
            }
        }
    }
}

impl Iterator for BatchStream {
    type Item = Result<DateBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let received = self.receiver.as_ref()?.recv();
        match received {
            Ok(batch) => Some(batch),
            Err(_) => {
                self.receiver = None;
                match self.producer.take().map(JoinHandle::join) {
                    Some(Err(_)) => Some(Err(WeatherError::Producer(
                        "date range producer panicked".to_string(),
                    ))),
                    _ => None,
                }
            }
        }
    }
}

impl Drop for BatchStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}
