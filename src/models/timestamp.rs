//! Boundary parsing for every date/time the bot accepts, either typed by a
//! chat user or returned by the calendar API. Everything is converted into
//! `DateTime<Utc>` (or a plain calendar date) here and rendered back into the
//! bot time zone only when a reply is formatted.

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

pub const DAY_FORMAT: &str = "%d/%m/%Y";
pub const TIME_FORMAT: &str = "%H:%M";
pub const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M";
pub const DAY_MONTH_FORMAT: &str = "%d/%m";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("invalid date '{0}', expected DD/MM/YYYY")]
    Day(String),

    #[error("invalid month '{0}', expected MM/YYYY")]
    Month(String),

    #[error("invalid time '{0}', expected HH:MM")]
    Time(String),

    #[error("invalid date and time '{0}', expected DD/MM/YYYY HH:MM")]
    DateTime(String),

    #[error("invalid RFC 3339 timestamp '{0}'")]
    Rfc3339(String),

    #[error("invalid all-day date '{0}', expected YYYY-MM-DD")]
    AllDay(String),

    #[error("local time {0} does not exist in time zone {1}")]
    NonexistentLocalTime(String, String),

    #[error("missing timestamp on event '{0}'")]
    Missing(String),
}

/// A calendar month as typed by users (`MM/YYYY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn label(&self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }
}

pub fn parse_day(input: &str) -> Result<NaiveDate, TimestampError> {
    NaiveDate::parse_from_str(input.trim(), DAY_FORMAT)
        .map_err(|_| TimestampError::Day(input.to_string()))
}

pub fn parse_time(input: &str) -> Result<NaiveTime, TimestampError> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map_err(|_| TimestampError::Time(input.to_string()))
}

pub fn parse_month(input: &str) -> Result<YearMonth, TimestampError> {
    let err = || TimestampError::Month(input.to_string());
    let (month, year) = input.trim().split_once('/').ok_or_else(err)?;
    let month: u32 = month.parse().map_err(|_| err())?;
    let year: i32 = year.parse().map_err(|_| err())?;
    if !(1..=12).contains(&month) || year.to_string().len() != 4 {
        return Err(err());
    }
    Ok(YearMonth { year, month })
}

/// Parses `DD/MM/YYYY HH:MM` as a wall-clock time in `tz`.
pub fn parse_local_datetime(input: &str, tz: Tz) -> Result<DateTime<Utc>, TimestampError> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), DATETIME_FORMAT)
        .map_err(|_| TimestampError::DateTime(input.to_string()))?;
    local_to_utc(naive, tz)
}

/// Parses an ISO-8601 / RFC 3339 timestamp with explicit offset.
pub fn parse_rfc3339(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TimestampError::Rfc3339(input.to_string()))
}

pub fn parse_all_day(input: &str) -> Result<NaiveDate, TimestampError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| TimestampError::AllDay(input.to_string()))
}

/// Resolves a wall-clock time in `tz`. Ambiguous times (DST fall-back) pick the
/// earlier instant; times skipped by a DST jump are rejected.
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, TimestampError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(TimestampError::NonexistentLocalTime(
            naive.to_string(),
            tz.name().to_string(),
        )),
    }
}

pub fn start_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, TimestampError> {
    local_to_utc(date.and_time(NaiveTime::MIN), tz)
}

pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn format_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(TIME_FORMAT).to_string()
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

pub fn format_day_month(date: NaiveDate) -> String {
    date.format(DAY_MONTH_FORMAT).to_string()
}
