pub mod city;
pub mod offset;
pub mod reading;

pub use city::{CityProfile, CitySummary, SampleBucket};
pub use offset::CalendarOffset;
pub use reading::{RangeResult, Reading};
