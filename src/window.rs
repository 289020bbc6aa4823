//! Selection window: an inclusive day range combined with an inclusive time-of-day range.
//!
//! Optional `not_before` / `not_after` bounds cut the window at an exact instant;
//! they narrow a follow-up run to the images an interrupted run left behind.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::errors::RangeError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const INSTANT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionWindow {
    start_date: NaiveDate,
    end_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    not_before: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    not_after: Option<NaiveDateTime>,
}

impl SelectionWindow {
    /// Validate and build a window. Both ranges are inclusive.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, RangeError> {
        if start_date > end_date {
            return Err(RangeError::Dates {
                start: start_date.to_string(),
                end: end_date.to_string(),
            });
        }
        if start_time > end_time {
            return Err(RangeError::Times {
                start: start_time.to_string(),
                end: end_time.to_string(),
            });
        }
        Ok(Self {
            start_date,
            end_date,
            start_time,
            end_time,
            not_before: None,
            not_after: None,
        })
    }

    /// Cut the window at exact instants; either bound is inclusive.
    pub fn with_bounds(
        mut self,
        not_before: Option<NaiveDateTime>,
        not_after: Option<NaiveDateTime>,
    ) -> Result<Self, RangeError> {
        if let (Some(lo), Some(hi)) = (not_before, not_after) {
            if lo > hi {
                return Err(RangeError::Bounds {
                    not_before: lo.to_string(),
                    not_after: hi.to_string(),
                });
            }
        }
        self.not_before = not_before;
        self.not_after = not_after;
        Ok(self)
    }

    /// Whole days, every time of day.
    pub fn days(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, RangeError> {
        Self::new(start_date, end_date, day_start(), day_end())
    }

    /// Build from CLI strings: dates as `YYYY-MM-DD`, optional times as `HH:MM:SS` (or `HH:MM`).
    pub fn parse(
        start_date: &str,
        end_date: &str,
        start_time: Option<&str>,
        end_time: Option<&str>,
    ) -> Result<Self, RangeError> {
        let start_date = parse_date("start date", start_date)?;
        let end_date = parse_date("end date", end_date)?;
        let start_time = start_time
            .map(|t| parse_time("start time", t))
            .transpose()?
            .unwrap_or_else(day_start);
        let end_time = end_time
            .map(|t| parse_time("end time", t))
            .transpose()?
            .unwrap_or_else(day_end);
        Self::new(start_date, end_date, start_time, end_time)
    }

    /// Date range, time-of-day range and any instant bounds.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let time = ts.time();
        self.contains_date(ts)
            && self.start_time <= time
            && time <= self.end_time
            && self.not_before.is_none_or(|lo| lo <= ts)
            && self.not_after.is_none_or(|hi| ts <= hi)
    }

    /// Date range only.
    pub fn contains_date(&self, ts: NaiveDateTime) -> bool {
        let date = ts.date();
        self.start_date <= date && date <= self.end_date
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn not_before(&self) -> Option<NaiveDateTime> {
        self.not_before
    }

    pub fn not_after(&self) -> Option<NaiveDateTime> {
        self.not_after
    }
}

/// Parse an instant as `YYYY-MM-DDTHH:MM:SS` (a space also separates date and time).
pub fn parse_instant(what: &'static str, value: &str) -> Result<NaiveDateTime, RangeError> {
    let v = value.trim();
    INSTANT_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(v, f).ok())
        .ok_or_else(|| RangeError::Format {
            what,
            value: value.to_string(),
            format: "YYYY-MM-DDTHH:MM:SS",
        })
}

fn day_start() -> NaiveTime {
    NaiveTime::MIN
}

fn day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

fn parse_date(what: &'static str, value: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| RangeError::Format {
        what,
        value: value.to_string(),
        format: "YYYY-MM-DD",
    })
}

fn parse_time(what: &'static str, value: &str) -> Result<NaiveTime, RangeError> {
    let v = value.trim();
    NaiveTime::parse_from_str(v, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M"))
        .map_err(|_| RangeError::Format {
            what,
            value: value.to_string(),
            format: "HH:MM:SS",
        })
}
