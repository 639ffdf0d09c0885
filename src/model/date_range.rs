use chrono::{NaiveDate, NaiveTime};

use crate::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open `[start, end)` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| AppError::InvalidDate(trimmed.to_string()))
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::InvalidDateRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, AppError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Start of range as a unix timestamp (UTC midnight).
    pub fn start_unix(&self) -> i64 {
        self.start.and_time(NaiveTime::MIN).and_utc().timestamp()
    }

    /// End of range as a unix timestamp (UTC midnight, exclusive).
    pub fn end_unix(&self) -> i64 {
        self.end.and_time(NaiveTime::MIN).and_utc().timestamp()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}
