pub mod aggregator;
pub mod date_range;
pub mod duration_parser;
pub mod key_lock;
pub mod sample_selector;
pub mod synthesizer;

pub use aggregator::{AggregationEngine, RunningStats};
pub use date_range::{BatchStream, DateBatch, DateBatches, DateRangeStreamer};
pub use duration_parser::DurationParser;
pub use key_lock::{KeyGuard, KeyLocks};
pub use sample_selector::SampleSelector;
pub use synthesizer::TemperatureSynthesizer;
