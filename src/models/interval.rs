use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::models::timestamp::{self, TimestampError};

pub const WORKDAY_START_HOUR: u32 = 8;
pub const WORKDAY_END_HOUR: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Zero-length or inverted; occurs only with malformed upstream data.
    pub fn is_degenerate(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// The 08:00 to 18:00 local-time range considered for free-time queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingWindow {
    pub day_start: DateTime<Utc>,
    pub day_end: DateTime<Utc>,
}

impl WorkingWindow {
    pub fn for_day(date: NaiveDate, tz: Tz) -> Result<Self, TimestampError> {
        let at = |hour: u32| {
            let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
            timestamp::local_to_utc(date.and_time(time), tz)
        };
        Ok(Self {
            day_start: at(WORKDAY_START_HOUR)?,
            day_end: at(WORKDAY_END_HOUR)?,
        })
    }

    pub fn as_interval(&self) -> Interval {
        Interval::new(self.day_start, self.day_end)
    }
}
