use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeatherError>;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("'{0}' is not a valid duration. Expected forms like 1Y3M2D, 1Y2M, 3M2D or 3D")]
    InvalidDurationFormat(String),

    #[error("No data for city '{0}'")]
    CityNotFound(String),

    #[error("No temperature sample for {city} on month {month}, day {day}")]
    SampleNotFound { city: String, month: u32, day: u32 },

    #[error("Degenerate temperature range [{min}, {max}] for {city} (month {month}, day {day})")]
    DegenerateRange {
        city: String,
        month: u32,
        day: u32,
        min: i32,
        max: i32,
    },

    #[error("City catalog error: {0}")]
    Catalog(String),

    #[error("Reading store error: {0}")]
    Store(String),

    #[error("Date range produced no timestamps")]
    EmptyRange,

    #[error("Invalid time '{input}'. Expected 2015-04-02T17:00:00 or 2015-04-02T17:00:00+02:00")]
    InvalidTime { input: String },

    #[error("Unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Date producer failed: {0}")]
    Producer(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl From<tempfile::PersistError> for WeatherError {
    fn from(err: tempfile::PersistError) -> Self {
        WeatherError::Io(err.error)
    }
}
