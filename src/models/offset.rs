use serde::{Deserialize, Serialize};

/// A (years, months, days) amount subtracted from a timestamp on the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarOffset {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl CalendarOffset {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }
}

impl std::fmt::Display for CalendarOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.years > 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months > 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days > 0 || self.is_zero() {
            write!(f, "{}D", self.days)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_skips_empty_units() {
        assert_eq!(CalendarOffset::new(1, 2, 3).to_string(), "1Y2M3D");
        assert_eq!(CalendarOffset::new(0, 3, 0).to_string(), "3M");
        assert_eq!(CalendarOffset::new(2, 0, 10).to_string(), "2Y10D");
        assert_eq!(CalendarOffset::default().to_string(), "0D");
        assert!(CalendarOffset::default().is_zero());
    }
}
