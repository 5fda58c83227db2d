/// Days per batch handed from the date producer to the aggregator
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Sample buckets start on these days of the month
pub const BUCKET_STEP_DAYS: u32 = 10;
pub const FIRST_BUCKET_DAY: u32 = 1;

/// Random spread applied around a bucket's configured range
pub const LOW_SPREAD: i32 = 2; // R1 in 0..2
pub const HIGH_SPREAD: i32 = 3; // R2 in 0..3

/// File names
pub const CITIES_FILE: &str = "cities.json";
pub const READINGS_FILE_EXTENSION: &str = "json";
pub const CONFIG_FILE: &str = "weather-station";

/// Defaults
pub const DEFAULT_DATA_DIR: &str = "resources";
pub const DEFAULT_CITY: &str = "DKR";

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "WEATHER_STATION";

/// Local timestamp without offset, as accepted on the command line
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
