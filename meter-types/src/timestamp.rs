//! Record timestamps as written by the metering device.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::TimestampError;

/// Parse pattern for record timestamps, e.g. `2025-5-21 11:45`.
///
/// chrono accepts one or two digits for every numeric field, so unpadded
/// months, days and hours parse without extra handling.
const FORMAT: &str = "%Y-%m-%d %H:%M";

/// A reading time with minute precision, in the device's local time.
///
/// Ordering is chronological, which is what "latest record" selection relies
/// on. The wire format is `{year}-{month}-{day} {hour}:{minute}` on a 24-hour
/// clock with month and day not zero-padded.
///
/// ```
/// use meter_types::Timestamp;
///
/// let earlier: Timestamp = "2025-5-9 23:59".parse().unwrap();
/// let later: Timestamp = "2025-5-10 00:00".parse().unwrap();
/// assert!(later > earlier);
/// assert_eq!(later.to_string(), "2025-5-10 00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Wrap an existing date-time, truncating seconds.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self(
            datetime
                .with_second(0)
                .and_then(|dt| dt.with_nanosecond(0))
                .unwrap_or(datetime),
        )
    }

    /// The underlying date-time.
    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// Calendar date of the reading.
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TimestampError::Empty);
        }
        NaiveDateTime::parse_from_str(trimmed, FORMAT)
            .map(Self)
            .map_err(|source| TimestampError::Invalid {
                value: s.to_string(),
                source,
            })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{} {:02}:{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour(),
            self.0.minute()
        )
    }
}
