pub mod constants;
pub mod progress;
pub mod time;

pub use constants::*;
pub use progress::ProgressReporter;
pub use time::{current_hour, parse_city_time, resolve_local, truncate_to_hour};
